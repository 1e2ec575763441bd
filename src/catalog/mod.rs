//! Static PGN catalog, generated at build time from the bundled CANboat-style
//! JSON definitions (see `build.rs` / `build_core`). `PGNS` and
//! `LOOKUP_TABLES` are process-wide immutable after startup.

include!(concat!(env!("OUT_DIR"), "/catalog_generated.rs"));

pub mod lookup;
