//! Linux SocketCAN `candump` output, in its common log-file and live-capture
//! shapes. The four variants canboat recognises differ only in whether a
//! timestamp is present and how it's bracketed; this parser accepts all of
//! them with one pass over the whitespace-split tokens.
use crate::core::RawMessage;
use crate::error::RawLineError;
use crate::transport::can_id::CanId;

pub(super) fn looks_like(line: &str) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let has_hash_id = tokens
        .iter()
        .any(|t| t.contains('#') && t.splitn(2, '#').next().is_some_and(|id| !id.is_empty()));
    let has_bracket_len = tokens
        .iter()
        .any(|t| t.starts_with('[') && t.trim_matches(|c| c == '[' || c == ']').parse::<u8>().is_ok());
    has_hash_id || has_bracket_len
}

pub(super) fn parse(line: &str) -> Result<RawMessage, RawLineError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let (timestamp, rest) = match tokens.first() {
        Some(t) if t.starts_with('(') && t.ends_with(')') => {
            (t.trim_start_matches('(').trim_end_matches(')').to_string(), &tokens[1..])
        }
        Some(t) if t.parse::<f64>().is_ok() => (t.to_string(), &tokens[1..]),
        _ => (String::new(), &tokens[..]),
    };

    // rest is now [interface, "canid#data"] or [interface, canid, "[len]", byte...]
    let [_interface, second, tail @ ..] = rest else {
        return Err(RawLineError::Malformed(line.to_string()));
    };

    let (id_hex, data) = if let Some((id_hex, hex_data)) = second.split_once('#') {
        (id_hex.to_string(), super::parse_hex_bytes(hex_data)?)
    } else {
        let mut data = Vec::new();
        for token in tail {
            if token.starts_with('[') {
                continue;
            }
            data.push(u8::from_str_radix(token, 16)?);
        }
        (second.to_string(), data)
    };

    let raw_id = u32::from_str_radix(&id_hex, 16)?;
    let can_id = CanId(raw_id);

    Ok(RawMessage {
        timestamp,
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
    fn parses_socketcan_log_format() {
        let line = "(1234567890.123456) can0 18FEF123#0102030405060708";
        assert!(looks_like(line));
        let msg = parse(line).unwrap();
        assert_eq!(msg.src, 0x23);
        assert_eq!(msg.data.len(), 8);
        assert_eq!(msg.timestamp, "1234567890.123456");
    }

    #[test]
    fn parses_live_capture_format() {
        let line = "can0  18FEF123   [8]  01 02 03 04 05 06 07 08";
        let msg = parse(line).unwrap();
        assert_eq!(msg.pgn, can_id_pgn_of(0x18FEF123));
        assert_eq!(msg.data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    fn can_id_pgn_of(raw: u32) -> u32 {
        CanId(raw).pgn()
    }
}
