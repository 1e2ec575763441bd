//! Translates a deserialized [`Catalog`] into the Rust source text for
//! `OUT_DIR/catalog_generated.rs`: two static arrays, `PGNS` and
//! `LOOKUP_TABLES`, matching the descriptor contract in `src/core.rs`.
use std::fmt::Write as _;

use crate::build_core::domain::{Catalog, CatalogField, CatalogPgn, LookupTableJson};
use crate::build_core::errors::BuildError;

/// Field kinds understood by `src/core.rs::FieldKind`. Anything else in the
/// catalog JSON is a build-time error rather than a silent fallback, since a
/// typo here would otherwise surface only as a runtime decode failure.
const VALID_KINDS: &[&str] = &[
    "Number",
    "Lookup",
    "IndirectLookup",
    "BitLookup",
    "Pgn",
    "Date",
    "Time",
    "Lla32",
    "Lla64",
    "StringFix",
    "StringLz",
    "StringLau",
    "StringStartStop",
    "SixBitAscii",
    "Binary",
    "Variable",
    "Reserved",
    "Spare",
];

const VALID_PGN_TYPES: &[&str] = &["Single", "Fast", "IsoTp", "Mixed"];

/// Validates one catalog entry against the invariants `decode_pgn` relies on:
/// no zero-length fields, a known `kind`/`pgn_type`, and repeating-group
/// indices within the field list.
fn validate(pgn: &CatalogPgn) -> Result<(), BuildError> {
    if !VALID_PGN_TYPES.contains(&pgn.pgn_type.as_str()) {
        return Err(BuildError::InvalidEntry {
            pgn: pgn.pgn,
            reason: format!("unknown pgn_type {:?}", pgn.pgn_type),
        });
    }
    for field in &pgn.fields {
        if !VALID_KINDS.contains(&field.kind.as_str()) {
            return Err(BuildError::InvalidEntry {
                pgn: pgn.pgn,
                reason: format!("field {:?} has unknown kind {:?}", field.name, field.kind),
            });
        }
        if field.bits == 0 && field.kind != "StringLz" && field.kind != "StringLau" && field.kind != "StringStartStop" {
            return Err(BuildError::InvalidEntry {
                pgn: pgn.pgn,
                reason: format!("field {:?} has zero bit length", field.name),
            });
        }
    }
    for repeating in pgn.repeating1.iter().chain(pgn.repeating2.iter()) {
        if repeating.start_field_index >= pgn.fields.len() {
            return Err(BuildError::InvalidEntry {
                pgn: pgn.pgn,
                reason: format!(
                    "repeating group start_field_index {} is out of bounds ({} fields)",
                    repeating.start_field_index,
                    pgn.fields.len()
                ),
            });
        }
        if let Some(count_index) = repeating.count_field_index {
            if count_index >= pgn.fields.len() {
                return Err(BuildError::InvalidEntry {
                    pgn: pgn.pgn,
                    reason: format!(
                        "repeating group count_field_index {count_index} is out of bounds"
                    ),
                });
            }
        }
    }
    for m in &pgn.match_fields {
        if m.field_index >= pgn.fields.len() {
            return Err(BuildError::InvalidEntry {
                pgn: pgn.pgn,
                reason: format!("match_fields index {} is out of bounds", m.field_index),
            });
        }
    }
    Ok(())
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn write_field(out: &mut String, field: &CatalogField) -> Result<(), BuildError> {
    let lookup = match &field.lookup {
        Some(name) => format!("Some(\"{}\")", escape(name)),
        None => "None".to_string(),
    };
    let unit = match &field.unit {
        Some(name) => format!("Some(\"{}\")", escape(name)),
        None => "None".to_string(),
    };
    writeln!(
        out,
        "        FieldDescriptor {{ name: \"{}\", kind: FieldKind::{}, bits: {}, is_signed: {}, resolution: {:?}, offset: {}, lookup: {}, unit: {} }},",
        escape(&field.name),
        field.kind,
        field.bits,
        field.is_signed,
        field.resolution,
        field.offset,
        lookup,
        unit,
    )?;
    Ok(())
}

fn write_repeating(out: &mut String, name: &str, repeating: &Option<crate::build_core::domain::CatalogRepeating>) -> Result<(), BuildError> {
    match repeating {
        Some(r) => {
            let count = match r.count_field_index {
                Some(i) => format!("Some({i})"),
                None => "None".to_string(),
            };
            writeln!(
                out,
                "    {name}: Some(RepeatingFieldSet {{ count_field_index: {count}, start_field_index: {}, size: {} }}),",
                r.start_field_index, r.size,
            )?;
        }
        None => writeln!(out, "    {name}: None,")?,
    }
    Ok(())
}

fn write_pgn(out: &mut String, pgn: &CatalogPgn) -> Result<(), BuildError> {
    writeln!(out, "PgnDescriptor {{")?;
    writeln!(out, "    pgn: {},", pgn.pgn)?;
    writeln!(out, "    description: \"{}\",", escape(&pgn.description))?;
    writeln!(out, "    pgn_type: PgnType::{},", pgn.pgn_type)?;
    writeln!(out, "    fields: &[")?;
    for field in &pgn.fields {
        write_field(out, field)?;
    }
    writeln!(out, "    ],")?;
    write_repeating(out, "repeating1", &pgn.repeating1)?;
    write_repeating(out, "repeating2", &pgn.repeating2)?;
    writeln!(out, "    match_fields: &[")?;
    for m in &pgn.match_fields {
        writeln!(out, "        MatchField {{ field_index: {}, value: {} }},", m.field_index, m.value)?;
    }
    writeln!(out, "    ],")?;
    writeln!(out, "    fallback: {},", pgn.fallback)?;
    write!(out, "}}")?;
    Ok(())
}

fn write_lookup_table(out: &mut String, table: &LookupTableJson) -> Result<(), BuildError> {
    writeln!(out, "LookupTable {{")?;
    writeln!(out, "    name: \"{}\",", escape(&table.name))?;
    writeln!(out, "    entries: &[")?;
    for entry in &table.entries {
        writeln!(
            out,
            "        LookupEntry {{ value: {}, name: \"{}\" }},",
            entry.value,
            escape(&entry.name),
        )?;
    }
    writeln!(out, "    ],")?;
    write!(out, "}}")?;
    Ok(())
}

/// Builds the complete generated source file from a parsed catalog.
pub(crate) fn run(catalog: &Catalog) -> Result<String, BuildError> {
    for pgn in &catalog.pgns {
        validate(pgn)?;
    }

    let mut out = String::new();
    writeln!(out, "// Generated by build.rs from build_core/var/pgn_catalog.json. Do not edit.")?;
    writeln!(out, "use crate::core::{{FieldDescriptor, FieldKind, LookupEntry, LookupTable, MatchField, PgnDescriptor, PgnType, RepeatingFieldSet}};")?;
    writeln!(out)?;
    writeln!(out, "pub(crate) static PGNS: &[PgnDescriptor] = &[")?;
    for pgn in &catalog.pgns {
        write!(out, "    ")?;
        write_pgn(&mut out, pgn)?;
        writeln!(out, ",")?;
    }
    writeln!(out, "];")?;
    writeln!(out)?;
    writeln!(out, "pub(crate) static LOOKUP_TABLES: &[LookupTable] = &[")?;
    for table in &catalog.lookups {
        write!(out, "    ")?;
        write_lookup_table(&mut out, table)?;
        writeln!(out, ",")?;
    }
    writeln!(out, "];")?;

    Ok(out)
}
