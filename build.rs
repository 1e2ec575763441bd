//! Cargo build script: turns the bundled PGN/lookup catalog JSON into the
//! static descriptor tables the decoding engine walks at runtime.

// Re-export the core module from src/core.rs so build_core can reuse it
#[path = "src/core.rs"]
mod core;

mod build_core;
use crate::build_core::{conf::*, domain::Catalog, errors::BuildError, gen_catalog};

use std::fs;
use std::path::PathBuf;

// This build script is the core of the code generation pipeline for canboat-n2k.
// It reads the PGN/lookup catalog (JSON) and produces the static `PgnDescriptor`
// and `LookupTable` arrays that `engine::decode` interprets at runtime.
//
// The architecture intentionally separates the declarative data definitions
// (JSON) from the generic interpreter that walks them (`src/engine/decode.rs`).
// This script bridges the two.
//==================================================================================MAIN
fn main() -> Result<(), BuildError> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={CATALOG_PATH}");

    let catalog_string = fs::read_to_string(CATALOG_PATH).map_err(|e| BuildError::ReadFile {
        path: PathBuf::from(CATALOG_PATH),
        source: e,
    })?;
    let catalog: Catalog = serde_json::from_str(&catalog_string)?;

    println!(
        "cargo:warning=generating {} PGN descriptor(s) and {} lookup table(s)",
        catalog.pgns.len(),
        catalog.lookups.len()
    );

    let generated = gen_catalog::run(&catalog)?;

    let out_dir = std::env::var("OUT_DIR").map_err(|e| BuildError::OutDir { source: e })?;
    let dest_path = PathBuf::from(out_dir).join(OUT_DIR_CATALOG_FILE_NAME);
    fs::write(&dest_path, generated).map_err(|e| BuildError::WriteFile {
        path: dest_path,
        source: e,
    })?;

    Ok(())
}
