//! Actisense ASCII: `A<secs>.<ms> <srcdstprio-hex> <pgn-hex> <bytes…>`. The
//! second token packs source, destination and priority as three hex-byte
//! pairs back to back.
use crate::core::RawMessage;
use crate::error::RawLineError;

pub(super) fn parse(line: &str) -> Result<RawMessage, RawLineError> {
    let mut fields = line.split_whitespace();
    let ts_token = fields
        .next()
        .ok_or_else(|| RawLineError::Malformed(line.to_string()))?;
    let timestamp = ts_token
        .strip_prefix('A')
        .ok_or_else(|| RawLineError::Malformed(line.to_string()))?;

    let sdp = fields
        .next()
        .ok_or_else(|| RawLineError::Malformed(line.to_string()))?;
    if sdp.len() != 6 {
        return Err(RawLineError::Malformed(format!(
            "expected a 6-hex-digit src/dst/prio token, got {sdp}"
        )));
    }
    let src = u8::from_str_radix(&sdp[0..2], 16)?;
    let dst = u8::from_str_radix(&sdp[2..4], 16)?;
    let priority = u8::from_str_radix(&sdp[4..6], 16)?;

    let pgn_token = fields
        .next()
        .ok_or_else(|| RawLineError::Malformed(line.to_string()))?;
    let pgn = u32::from_str_radix(pgn_token, 16)?;

    let mut data = Vec::new();
    for byte in fields {
        data.push(u8::from_str_radix(byte, 16)?);
    }

    Ok(RawMessage {
        timestamp: timestamp.to_string(),
        priority,
        pgn,
        src,
        dst,
        data,
    })
}
