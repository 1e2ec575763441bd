//! Error set that can occur while generating code during the build step.
use std::env::VarError;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the build script (JSON parsing, validation, code generation).
pub(crate) enum BuildError {
    /// Failed to read the `OUT_DIR` environment variable.
    #[error("OUT_DIR error: {source}")]
    OutDir {
        #[source]
        source: VarError,
    },

    /// Failure while parsing the catalog JSON document.
    #[error("malformed catalog JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    /// Unable to read the catalog file from disk.
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the generated code to disk.
    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Formatting error while writing generated code.
    #[error("failed to format generated code: {0}")]
    Writeln(#[from] std::fmt::Error),

    /// A catalog entry failed structural validation (spec §9: "validate that
    /// every PGN entry's field list is internally consistent").
    #[error("catalog entry for PGN {pgn} is invalid: {reason}")]
    InvalidEntry { pgn: u32, reason: String },
}
