//! YDWG-02 (Yacht Devices Wifi Gateway): `HH:MM:SS.mmm R <canid-hex> <bytes…>`.
//! `R` marks a received frame, `T` a transmitted one; only received frames
//! carry data worth decoding here.
use crate::core::RawMessage;
use crate::error::RawLineError;
use crate::transport::can_id::CanId;

pub(super) fn looks_like(line: &str) -> bool {
    let mut fields = line.split_whitespace();
    let Some(ts) = fields.next() else {
        return false;
    };
    let Some(dir) = fields.next() else {
        return false;
    };
    let Some(id) = fields.next() else {
        return false;
    };
    ts.len() >= 8
        && ts.as_bytes().get(2) == Some(&b':')
        && (dir == "R" || dir == "T")
        && u32::from_str_radix(id, 16).is_ok()
}

pub(super) fn parse(line: &str) -> Result<RawMessage, RawLineError> {
    let mut fields = line.split_whitespace();
    let timestamp = fields
        .next()
        .ok_or_else(|| RawLineError::Malformed(line.to_string()))?;
    let _direction = fields
        .next()
        .ok_or_else(|| RawLineError::Malformed(line.to_string()))?;
    let id_hex = fields
        .next()
        .ok_or_else(|| RawLineError::Malformed(line.to_string()))?;
    let raw_id = u32::from_str_radix(id_hex, 16)?;
    let can_id = CanId(raw_id);

    let mut data = Vec::new();
    for byte in fields {
        data.push(u8::from_str_radix(byte, 16)?);
    }

    Ok(RawMessage {
        timestamp: timestamp.to_string(),
        priority: can_id.priority(),
        pgn: can_id.pgn(),
        src: can_id.source_address(),
        dst: can_id.destination().unwrap_or(255),
        data,
    })
}
