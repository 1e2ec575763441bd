//! Paths and constants used during build-time code generation.
//==================================================================================CONF
/// Bundled CANboat-style PGN/lookup catalog, in JSON.
pub(crate) const CATALOG_PATH: &str = "build_core/var/pgn_catalog.json";
/// Generated catalog file name (written to `OUT_DIR`), included by `src/catalog/mod.rs`.
pub(crate) const OUT_DIR_CATALOG_FILE_NAME: &str = "catalog_generated.rs";
