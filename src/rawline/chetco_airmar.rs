//! Two compact, vendor-specific dialects that each get their own grammar but
//! share no code worth factoring out.
use crate::core::RawMessage;
use crate::error::RawLineError;
use crate::transport::can_id::CanId;

/// Chetco SeaSmart gateways: `$PCDIN,<pgn-hex>,<timestamp-hex>,<src-hex>,<data-hex>*<checksum>`.
pub(super) fn parse_chetco(line: &str) -> Result<RawMessage, RawLineError> {
    let body = line.strip_prefix("$PCDIN,").ok_or_else(|| RawLineError::Malformed(line.to_string()))?;
    let body = body.split('*').next().unwrap_or(body);
    let fields: Vec<&str> = body.split(',').collect();
    let [pgn_hex, ts_hex, src_hex, data_hex] = fields.as_slice() else {
        return Err(RawLineError::Malformed(line.to_string()));
    };
    let pgn = u32::from_str_radix(pgn_hex, 16)?;
    let timestamp_ms = u64::from_str_radix(ts_hex, 16)?;
    let src = u8::from_str_radix(src_hex, 16)?;
    let data = super::parse_hex_bytes(data_hex)?;

    Ok(RawMessage {
        timestamp: timestamp_ms.to_string(),
        priority: 6,
        pgn,
        src,
        dst: 255,
        data,
    })
}

/// Airmar PB200/WeatherStation gateways: `-<secs>.<ms> <canid-hex> <bytes…>`.
pub(super) fn parse_airmar(line: &str) -> Result<RawMessage, RawLineError> {
    let body = line.strip_prefix('-').ok_or_else(|| RawLineError::Malformed(line.to_string()))?;
    let mut fields = body.split_whitespace();
    let timestamp = fields
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chetco_line() {
        let line = "$PCDIN,01F801,000B6DB8,23,E67C2F1100A000FC*1F";
        let msg = parse_chetco(line).unwrap();
        assert_eq!(msg.pgn, 0x01F801);
        assert_eq!(msg.src, 0x23);
        assert_eq!(msg.data.len(), 8);
    }

    #[test]
    fn parses_airmar_line() {
        let line = "-12.345 09F80123 01 02 03 04 05 06 07 08";
        let msg = parse_airmar(line).unwrap();
        assert_eq!(msg.src, 0x23);
        assert_eq!(msg.data.len(), 8);
    }
}
