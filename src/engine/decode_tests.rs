use super::*;
use crate::core::{FieldKind, PgnType, RepeatingFieldSet};
use crate::engine::sentinel::Sentinel;

#[test]
fn decodes_signed_rate_of_turn() {
    // PGN 127251: byte0 SID, 4-byte signed rate, 3 reserved bytes.
    static FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor {
            name: "SID",
            kind: FieldKind::Number,
            bits: 8,
            is_signed: false,
            resolution: 0.0,
            offset: 0,
            lookup: None,
            unit: None,
        },
        FieldDescriptor {
            name: "Rate",
            kind: FieldKind::Number,
            bits: 32,
            is_signed: true,
            resolution: 3.125e-5,
            offset: 0,
            lookup: None,
            unit: Some("rad"),
        },
    ];
    static DESC: PgnDescriptor = PgnDescriptor {
        pgn: 127251,
        description: "Rate of Turn",
        pgn_type: PgnType::Single,
        fields: FIELDS,
        repeating1: None,
        repeating2: None,
        match_fields: &[],
        fallback: false,
    };

    let payload = [0xFF, 0x80, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF];
    let decoded = decode_pgn(&DESC, &payload).unwrap();
    assert!(decoded.complete);
    let rate = decoded.fields.iter().find(|f| f.name == "Rate").unwrap();
    match rate.value {
        FieldValue::Number(v) => assert!((v - (-0x80i64 as f64 * 3.125e-5)).abs() < 1e-12),
        ref other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn error_sentinel_suppresses_number() {
    static FIELDS: &[FieldDescriptor] = &[FieldDescriptor {
        name: "Speed",
        kind: FieldKind::Number,
        bits: 16,
        is_signed: false,
        resolution: 0.01,
        offset: 0,
        lookup: None,
        unit: None,
    }];
    static DESC: PgnDescriptor = PgnDescriptor {
        pgn: 999,
        description: "test",
        pgn_type: PgnType::Single,
        fields: FIELDS,
        repeating1: None,
        repeating2: None,
        match_fields: &[],
        fallback: false,
    };

    // 0xFFFF is the all-ones value for a 16-bit unsigned field => Error sentinel.
    let payload = [0xFF, 0xFF];
    let decoded = decode_pgn(&DESC, &payload).unwrap();
    let f = &decoded.fields[0];
    assert!(matches!(f.value, FieldValue::Sentinel(Sentinel::Error)));

    // 0xFFFE is one below max => Unknown sentinel.
    let payload = [0xFE, 0xFF];
    let decoded = decode_pgn(&DESC, &payload).unwrap();
    assert!(matches!(
        decoded.fields[0].value,
        FieldValue::Sentinel(Sentinel::Unknown)
    ));
}

#[test]
fn repeating_group_reads_counted_rows() {
    static FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor {
            name: "Count",
            kind: FieldKind::Number,
            bits: 8,
            is_signed: false,
            resolution: 0.0,
            offset: 0,
            lookup: None,
            unit: None,
        },
        FieldDescriptor {
            name: "Item",
            kind: FieldKind::Number,
            bits: 8,
            is_signed: false,
            resolution: 0.0,
            offset: 0,
            lookup: None,
            unit: None,
        },
    ];
    static DESC: PgnDescriptor = PgnDescriptor {
        pgn: 1000,
        description: "test repeating",
        pgn_type: PgnType::Fast,
        fields: FIELDS,
        repeating1: Some(RepeatingFieldSet {
            count_field_index: Some(0),
            start_field_index: 1,
            size: 1,
        }),
        repeating2: None,
        match_fields: &[],
        fallback: false,
    };

    let payload = [3, 10, 20, 30];
    let decoded = decode_pgn(&DESC, &payload).unwrap();
    assert!(decoded.complete);
    assert_eq!(decoded.repeating1.len(), 3);
    assert!(matches!(decoded.repeating1[0][0].value, FieldValue::Integer(10)));
    assert!(matches!(decoded.repeating1[2][0].value, FieldValue::Integer(30)));
}

#[test]
fn truncated_payload_marks_incomplete() {
    static FIELDS: &[FieldDescriptor] = &[FieldDescriptor {
        name: "Wide",
        kind: FieldKind::Number,
        bits: 32,
        is_signed: false,
        resolution: 0.0,
        offset: 0,
        lookup: None,
        unit: None,
    }];
    static DESC: PgnDescriptor = PgnDescriptor {
        pgn: 1001,
        description: "test truncated",
        pgn_type: PgnType::Single,
        fields: FIELDS,
        repeating1: None,
        repeating2: None,
        match_fields: &[],
        fallback: false,
    };
    let payload = [0x01, 0x02];
    let decoded = decode_pgn(&DESC, &payload).unwrap();
    assert!(!decoded.complete);
    assert!(decoded.fields.is_empty());
}

#[test]
fn string_fix_trims_padding() {
    static FIELDS: &[FieldDescriptor] = &[FieldDescriptor {
        name: "Name",
        kind: FieldKind::StringFix,
        bits: 64,
        is_signed: false,
        resolution: 0.0,
        offset: 0,
        lookup: None,
        unit: None,
    }];
    static DESC: PgnDescriptor = PgnDescriptor {
        pgn: 1002,
        description: "test string",
        pgn_type: PgnType::Single,
        fields: FIELDS,
        repeating1: None,
        repeating2: None,
        match_fields: &[],
        fallback: false,
    };
    let payload = *b"BOAT\xFF\xFF\xFF\xFF";
    let decoded = decode_pgn(&DESC, &payload).unwrap();
    assert!(matches!(&decoded.fields[0].value, FieldValue::Text(s) if s == "BOAT"));
}
