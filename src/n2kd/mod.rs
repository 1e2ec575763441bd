//! n2kd: the multi-client TCP fan-out server (Component G). Decoded PGNs
//! flow in from the frame/rawline pipeline, get folded into a keyed state
//! map with per-message-class expiry, optionally rate-limited, optionally
//! re-derived as NMEA 0183 sentences, and broadcast out to every connected
//! client.
pub mod nmea0183;
pub mod rate_limiter;
pub mod server;
pub mod state;
