//! End-to-end scenarios exercising the full stdin-line-to-decoded-field
//! pipeline: raw-line parsing, PGN variant lookup, and bit-level decoding
//! against the generated catalog.
use canboat_n2k::catalog::lookup::find_descriptor;
use canboat_n2k::engine::decode::{decode_pgn, FieldValue};
use canboat_n2k::rawline::{self, Dialect};
use canboat_n2k::transport::can_frame::CanFrame;
use canboat_n2k::transport::can_id::CanId;
use canboat_n2k::transport::fastpacket::{FastPacketPool, Progress};

fn field<'a>(
    decoded: &'a canboat_n2k::engine::decode::DecodedPgn,
    name: &str,
) -> &'a FieldValue {
    &decoded
        .fields
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("missing field {name}"))
        .value
}

#[test]
fn rate_of_turn_single_frame_decodes_signed_rate() {
    let line = "2024-01-01T00:00:00.000,2,127251,35,255,8,FF,80,00,00,00,FF,FF,FF";
    let raw = rawline::parse(Dialect::PlainOrFast, line).unwrap();
    let descriptor = find_descriptor(raw.pgn, &raw.data).expect("127251 must be catalogued");
    let decoded = decode_pgn(descriptor, &raw.data).unwrap();
    assert!(decoded.complete);
    match field(&decoded, "Rate") {
        FieldValue::Number(rate) => assert!((*rate - 0.004).abs() < 1e-6),
        other => panic!("unexpected Rate value: {other:?}"),
    }
}

#[test]
fn wind_data_single_frame_decodes_speed_angle_and_reference() {
    let line = "2024-01-01T00:00:00.000,2,130306,12,255,8,FF,64,00,10,27,02,FF,FF";
    let raw = rawline::parse(Dialect::PlainOrFast, line).unwrap();
    let descriptor = find_descriptor(raw.pgn, &raw.data).expect("130306 must be catalogued");
    let decoded = decode_pgn(descriptor, &raw.data).unwrap();
    assert!(decoded.complete);

    match field(&decoded, "Wind Speed") {
        FieldValue::Number(v) => assert!((*v - 1.00).abs() < 1e-9),
        other => panic!("unexpected Wind Speed: {other:?}"),
    }
    match field(&decoded, "Wind Angle") {
        FieldValue::Number(v) => assert!((*v - 1.0).abs() < 1e-9),
        other => panic!("unexpected Wind Angle: {other:?}"),
    }
    match field(&decoded, "Reference") {
        FieldValue::Lookup { raw, name } => {
            assert_eq!(*raw, 2);
            assert_eq!(*name, Some("Apparent"));
        }
        other => panic!("unexpected Reference: {other:?}"),
    }
}

#[test]
fn iso_request_decodes_the_requested_pgn() {
    let line = "2024-01-01T00:00:00.000,6,59904,5,255,3,14,F0,01";
    let raw = rawline::parse(Dialect::PlainOrFast, line).unwrap();
    let descriptor = find_descriptor(raw.pgn, &raw.data).expect("59904 must be catalogued");
    let decoded = decode_pgn(descriptor, &raw.data).unwrap();
    match field(&decoded, "PGN") {
        FieldValue::Integer(pgn) => assert_eq!(*pgn, 126996),
        other => panic!("unexpected PGN field: {other:?}"),
    }
}

/// PGN 126208's `Value` field is sized from the PGN/field it references, not
/// from the raw number preceding it: here "Parameter Number" 2 points at
/// 127251's second field ("Rate", 32 bits signed), so `Value` must be read
/// as 32 bits even though nothing in 126208 itself says so.
#[test]
fn group_function_value_field_is_sized_from_the_referenced_pgn() {
    // Function Code=1 (Command), PGN=127251 (LE), Priority=2/Reserved=0xF,
    // Number of Parameters=1, Parameter Number=2, Value=12345 (LE, 32 bits).
    let line = "2024-01-01T00:00:00.000,3,126208,10,255,11,01,13,F1,01,F2,01,02,39,30,00,00";
    let raw = rawline::parse(Dialect::PlainOrFast, line).unwrap();
    let descriptor = find_descriptor(raw.pgn, &raw.data).expect("126208 must be catalogued");
    let decoded = decode_pgn(descriptor, &raw.data).unwrap();
    assert!(decoded.complete);
    assert_eq!(decoded.repeating1.len(), 1);
    let row = &decoded.repeating1[0];
    let value = row.iter().find(|f| f.name == "Value").expect("missing Value field");
    assert_eq!(value.value, FieldValue::Integer(12345));
}

/// Reassembles PGN 129029 (43-byte GNSS Position Data) from seven Fast-Packet
/// frames delivered out of order, then decodes latitude/longitude.
#[test]
fn gnss_position_reassembles_across_fast_packet_frames() {
    let pgn = 129029u32;
    let src = 7u8;

    let mut payload = vec![0u8; 43];
    payload[0] = 0x01; // SID
    let lat_bytes = (1_234_567_890_000_000i64).to_le_bytes();
    payload[3..11].copy_from_slice(&lat_bytes);

    let mut pool = FastPacketPool::default();
    let frame_count = 1 + payload.len().saturating_sub(6).div_ceil(7);
    let mut frames = Vec::new();
    let mut offset = 0usize;
    for frame_idx in 0..frame_count {
        let mut data = [0xFFu8; 8];
        data[0] = frame_idx as u8;
        if frame_idx == 0 {
            data[1] = 43;
            let n = 6.min(payload.len());
            data[2..2 + n].copy_from_slice(&payload[..n]);
            offset = n;
        } else {
            let remaining = payload.len() - offset;
            let n = remaining.min(7);
            data[1..1 + n].copy_from_slice(&payload[offset..offset + n]);
            offset += n;
        }
        frames.push(CanFrame { id: CanId(src as u32), data, len: 8 });
    }

    // Deliver out of order (frame 0 must arrive first: a later frame-0 would
    // abort and restart the slot), shuffling only the continuation frames.
    let mut reordered = vec![frames[0].clone()];
    let mut rest = frames[1..].to_vec();
    rest.rotate_left(1);
    reordered.extend(rest);

    let mut complete_payload = None;
    for frame in &reordered {
        match pool.ingest(pgn, frame).unwrap() {
            Progress::Complete { payload, .. } => complete_payload = Some(payload),
            Progress::Pending => {}
        }
    }
    let reassembled = complete_payload.expect("pool should deliver a complete message");
    assert_eq!(reassembled.len(), 43);

    let raw = canboat_n2k::core::RawMessage {
        timestamp: "2024-01-01T00:00:00.000".into(),
        priority: 3,
        pgn,
        src,
        dst: 255,
        data: reassembled,
    };
    let descriptor = find_descriptor(raw.pgn, &raw.data).expect("129029 must be catalogued");
    let decoded = decode_pgn(descriptor, &raw.data).unwrap();
    assert!(decoded.complete);
    assert!(matches!(field(&decoded, "Latitude"), FieldValue::LatLon(_)));
}
