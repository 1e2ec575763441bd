use super::*;
use crate::core::{FieldDescriptor, FieldKind, MatchField, PgnType};

#[test]
fn matches_fields_accepts_discriminated_variant() {
    static FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor {
            name: "PGN",
            kind: FieldKind::Pgn,
            bits: 24,
            is_signed: false,
            resolution: 0.0,
            offset: 0,
            lookup: None,
            unit: None,
        },
        FieldDescriptor {
            name: "Function Code",
            kind: FieldKind::Number,
            bits: 8,
            is_signed: false,
            resolution: 0.0,
            offset: 0,
            lookup: None,
            unit: None,
        },
    ];
    static DESC_REQUEST: PgnDescriptor = PgnDescriptor {
        pgn: 126208,
        description: "NMEA - Request group function",
        pgn_type: PgnType::Fast,
        fields: FIELDS,
        repeating1: None,
        repeating2: None,
        match_fields: &[MatchField {
            field_index: 1,
            value: 0,
        }],
        fallback: false,
    };

    // Function Code byte is at bit offset 24, value 0 => matches.
    let payload = [0x00, 0xF2, 0x01, 0x00, 0, 0, 0, 0];
    assert!(matches_fields(&DESC_REQUEST, &payload));

    // Function Code byte 1 => does not match this variant.
    let payload2 = [0x00, 0xF2, 0x01, 0x01, 0, 0, 0, 0];
    assert!(!matches_fields(&DESC_REQUEST, &payload2));
}

#[test]
fn matches_fields_with_no_discriminator_always_matches() {
    static DESC: PgnDescriptor = PgnDescriptor {
        pgn: 127251,
        description: "Rate of Turn",
        pgn_type: PgnType::Single,
        fields: &[],
        repeating1: None,
        repeating2: None,
        match_fields: &[],
        fallback: false,
    };
    assert!(matches_fields(&DESC, &[]));
}
