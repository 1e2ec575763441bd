//! PLAIN, FAST and PLAIN_OR_FAST: `<timestamp>,<prio>,<pgn>,<src>,<dst>,<len>,<hex bytes>`.
//! The three dialects share this grammar; only the `len` field's relation to
//! the byte count on the line differs, and this parser doesn't need to care.
use crate::core::RawMessage;
use crate::error::RawLineError;

pub(super) fn looks_like(line: &str) -> bool {
    let fields: Vec<&str> = line.splitn(7, ',').collect();
    fields.len() >= 7 && fields[1].parse::<u8>().is_ok() && fields[2].parse::<u32>().is_ok()
}

pub(super) fn parse(line: &str) -> Result<RawMessage, RawLineError> {
    let fields: Vec<&str> = line.splitn(7, ',').collect();
    let [timestamp, priority, pgn, src, dst, len, rest] = fields.as_slice() else {
        return Err(RawLineError::Malformed(line.to_string()));
    };
    let len: usize = len.parse()?;
    let data = super::parse_hex_bytes(rest)?;
    if data.len() < len {
        return Err(RawLineError::Malformed(format!(
            "declared length {len} exceeds {} available bytes",
            data.len()
        )));
    }
    Ok(RawMessage {
        timestamp: timestamp.to_string(),
        priority: priority.parse()?,
        pgn: pgn.parse()?,
        src: src.parse()?,
        dst: dst.parse()?,
        data: data[..len].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_frame_line() {
        let line = "2026-01-01-12:00:00.000,2,127251,35,255,8,FF,80,00,00,00,FF,FF,FF";
        let msg = parse(line).unwrap();
        assert_eq!(msg.pgn, 127251);
        assert_eq!(msg.src, 35);
        assert_eq!(msg.data, vec![0xFF, 0x80, 0, 0, 0, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn parses_fast_multi_frame_line() {
        let hex = "01020304050607080910111213";
        let line = format!("2026-01-01-12:00:00.000,6,130306,1,255,13,{hex}");
        let msg = parse(&line).unwrap();
        assert_eq!(msg.data.len(), 13);
    }

    #[test]
    fn rejects_short_payload() {
        let line = "2026-01-01-12:00:00.000,2,127251,35,255,8,FF,80";
        assert!(parse(line).is_err());
    }
}
