//! PGN-variant discrimination and enumeration lookups against the
//! generated catalog.
use crate::core::{LookupTable, PgnDescriptor, PgnType};
use crate::engine::bits::BitReader;

use super::{LOOKUP_TABLES, PGNS};

/// Find the best-matching descriptor for a received `pgn` number. When
/// several catalog entries share the PGN (variants discriminated by fixed
/// field values), the payload is probed against each entry's `match_fields`
/// before falling back to the entry marked `fallback` — but only for
/// FAST/MIXED PGNs, where CANboat's own table allows a catch-all variant;
/// single-frame and ISO-TP PGNs that fail every `match_fields` probe are
/// genuinely unrecognized, not a case for the PDU-range fallback.
pub fn find_descriptor(pgn: u32, payload: &[u8]) -> Option<&'static PgnDescriptor> {
    let candidates: Vec<&'static PgnDescriptor> =
        PGNS.iter().filter(|d| d.pgn == pgn).collect();

    if candidates.len() <= 1 {
        return candidates.into_iter().next();
    }

    candidates
        .iter()
        .find(|d| !d.fallback && matches_fields(d, payload))
        .or_else(|| {
            candidates
                .iter()
                .find(|d| d.fallback && matches!(d.pgn_type, PgnType::Fast | PgnType::Mixed))
        })
        .copied()
}

/// Find a PGN's descriptor by number alone, without payload-based variant
/// discrimination: the non-fallback entry if there is one, else whatever
/// catalog entry carries that PGN. Used to resolve the bit width of a field
/// named by another message (PGN 126208's `Variable` fields), where there is
/// no payload of the *referenced* PGN on hand to probe with.
pub fn find_descriptor_by_pgn(pgn: u32) -> Option<&'static PgnDescriptor> {
    let mut candidates = PGNS.iter().filter(|d| d.pgn == pgn);
    candidates
        .clone()
        .find(|d| !d.fallback)
        .or_else(|| candidates.next())
}

/// Proprietary/manufacturer PDU ranges, each paired with the representative
/// PGN whose catalog entry (`fallback: true`) renders anything in that range
/// generically. Mirrors CANboat's own range-to-fallback-entry mapping.
const PDU_RANGE_FALLBACKS: &[(u32, u32, u32)] = &[
    (0xE800, 0xEEFF, 0xE800),   // 59392-61183: addressed single-frame, no specific definition
    (0xEF00, 0xEFFF, 0xEF00),   // 61184-61439: PDU1 proprietary single-frame
    (0xFF00, 0xFFFF, 0xFF00),   // 65280-65535: PDU2 proprietary single-frame
    (0x1EF00, 0x1EFFF, 0x1EF00), // 126720-126975: PDU2 proprietary fast-packet
    (0x1FF00, 0x1FFFF, 0x1FF00), // 130816-131071: PDU2 proprietary fast-packet
];

/// Render-only fallback for a PGN with no catalog entry at all: classify it
/// into its PDU range and return that range's generic `fallback: true`
/// entry, so the caller can still produce (incomplete) output instead of
/// dropping the message. Returns `None` outside every known range.
pub fn find_fallback_descriptor(pgn: u32) -> Option<&'static PgnDescriptor> {
    let base = PDU_RANGE_FALLBACKS
        .iter()
        .find(|(lo, hi, _)| pgn >= *lo && pgn <= *hi)
        .map(|(_, _, base)| *base)?;
    PGNS.iter().find(|d| d.pgn == base && d.fallback)
}

fn matches_fields(descriptor: &PgnDescriptor, payload: &[u8]) -> bool {
    if descriptor.match_fields.is_empty() {
        return true;
    }
    let mut reader = BitReader::new(payload);
    let mut idx = 0usize;
    for mf in descriptor.match_fields {
        while idx < mf.field_index {
            let Some(field) = descriptor.fields.get(idx) else {
                return false;
            };
            if reader.advance(field.bits).is_err() {
                return false;
            }
            idx += 1;
        }
        let Some(field) = descriptor.fields.get(mf.field_index) else {
            return false;
        };
        let raw = match reader.read_u64(field.bits.min(64) as u8) {
            Ok(v) => v,
            Err(_) => return false,
        };
        idx += 1;
        if raw != mf.value {
            return false;
        }
    }
    true
}

/// Look up a named enumeration table by its catalog name.
pub fn lookup_table(name: &str) -> Option<&'static LookupTable> {
    LOOKUP_TABLES.iter().find(|t| t.name == name)
}

#[cfg(test)]
#[path = "lookup_tests.rs"]
mod tests;
