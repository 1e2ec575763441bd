//! NMEA 2000 gateway toolkit: frame codecs for the Actisense NGT-1 and
//! Digital Yacht iKonvert dialects, a build-time-generated PGN catalog and
//! decoder, Fast-Packet reassembly, textual raw-line dialect parsing, a
//! line/JSON renderer, and the n2kd multi-client fan-out server.
//==================================================================================
/// Static PGN catalog generated at build time, plus variant discrimination.
pub mod catalog;
/// Render context and CLI-facing mode enums.
pub mod config;
/// Core data types shared by the build script and the decoding engine.
pub mod core;
/// Bit-level field extraction and the generic PGN decoder.
pub mod engine;
/// Domain errors and the top-level binary error/exit-code contract.
pub mod error;
/// NGT-1 and iKonvert byte-level frame codecs.
pub mod frame;
/// Shared `tracing` subscriber setup.
pub mod logging;
/// Multi-client TCP fan-out server: state map, rate limiting, NMEA 0183 derivation.
pub mod n2kd;
/// Textual raw-line dialect parsers (PLAIN, FAST, YDWG, candump, …).
pub mod rawline;
/// Text/JSON message rendering.
pub mod render;
/// CAN identifier decomposition, Fast-Packet reassembly.
pub mod transport;
//==================================================================================
