//! JSON data model for the bundled PGN/lookup catalog (`build_core/var/pgn_catalog.json`).
//!
//! This mirrors `src/core.rs`'s static descriptor contract field-for-field,
//! so the generator can translate a deserialized [`Catalog`] into Rust
//! source with no semantic gap between the two representations.
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct Catalog {
    pub(crate) pgns: Vec<CatalogPgn>,
    #[serde(default)]
    pub(crate) lookups: Vec<LookupTableJson>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogPgn {
    pub(crate) pgn: u32,
    pub(crate) description: String,
    /// One of `Single`, `Fast`, `IsoTp`, `Mixed`.
    pub(crate) pgn_type: String,
    pub(crate) fields: Vec<CatalogField>,
    #[serde(default)]
    pub(crate) repeating1: Option<CatalogRepeating>,
    #[serde(default)]
    pub(crate) repeating2: Option<CatalogRepeating>,
    #[serde(default)]
    pub(crate) match_fields: Vec<CatalogMatchField>,
    #[serde(default)]
    pub(crate) fallback: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogField {
    pub(crate) name: String,
    /// One of `Number`, `Lookup`, `IndirectLookup`, `BitLookup`, `Pgn`,
    /// `Date`, `Time`, `Lla32`, `Lla64`, `StringFix`, `StringLz`,
    /// `StringLau`, `StringStartStop`, `SixBitAscii`, `Binary`, `Variable`,
    /// `Reserved`, `Spare`.
    pub(crate) kind: String,
    pub(crate) bits: u32,
    #[serde(default)]
    pub(crate) is_signed: bool,
    #[serde(default)]
    pub(crate) resolution: f64,
    #[serde(default)]
    pub(crate) offset: i64,
    #[serde(default)]
    pub(crate) lookup: Option<String>,
    #[serde(default)]
    pub(crate) unit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogRepeating {
    #[serde(default)]
    pub(crate) count_field_index: Option<usize>,
    pub(crate) start_field_index: usize,
    pub(crate) size: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogMatchField {
    pub(crate) field_index: usize,
    pub(crate) value: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LookupTableJson {
    pub(crate) name: String,
    pub(crate) entries: Vec<LookupEntryJson>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LookupEntryJson {
    pub(crate) value: u64,
    pub(crate) name: String,
}
