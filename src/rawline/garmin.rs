//! Garmin's two CSV export flavors from its chartplotter NMEA 2000 log
//! viewer. Both carry a header row naming the columns; CSV2 adds a `Name`
//! column between `PGN` and `Source` that CSV1 doesn't have. Detection reads
//! the header; parsing is driven by the data rows' column count, since the
//! dialect alone doesn't carry the header's exact layout forward.
use crate::core::RawMessage;
use crate::error::RawLineError;

pub(super) fn looks_like_header(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.contains("pgn") && lower.contains("date") && lower.contains(',')
}

pub(super) fn is_csv2(line: &str) -> bool {
    line.to_ascii_lowercase().contains("name")
}

pub(super) fn parse(line: &str) -> Result<RawMessage, RawLineError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    // CSV1: Date,Time,PGN,Source,Destination,Priority,Length,Data
    // CSV2: Date,Time,PGN,Name,Source,Destination,Priority,Length,Data
    let (date, time, pgn, src, dst, priority, len, data_hex) = match fields.as_slice() {
        [date, time, pgn, src, dst, priority, len, data] => {
            (date, time, pgn, src, dst, priority, len, data)
        }
        [date, time, pgn, _name, src, dst, priority, len, data] => {
            (date, time, pgn, src, dst, priority, len, data)
        }
        _ => return Err(RawLineError::Malformed(line.to_string())),
    };

    let declared_len: usize = len.parse()?;
    let data = super::parse_hex_bytes(data_hex)?;
    if data.len() < declared_len {
        return Err(RawLineError::Malformed(format!(
            "declared length {declared_len} exceeds {} available bytes",
            data.len()
        )));
    }

    Ok(RawMessage {
        timestamp: format!("{date} {time}"),
        priority: priority.parse()?,
        pgn: pgn.parse()?,
        src: src.parse()?,
        dst: dst.parse()?,
        data: data[..declared_len].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_csv1_header() {
        let header = "Date,Time,PGN,Source,Destination,Priority,Length,Data";
        assert!(looks_like_header(header));
        assert!(!is_csv2(header));
    }

    #[test]
    fn detects_csv2_header() {
        let header = "Date,Time,PGN,Name,Source,Destination,Priority,Length,Data";
        assert!(looks_like_header(header));
        assert!(is_csv2(header));
    }

    #[test]
    fn parses_csv1_data_row() {
        let line = "2026-01-01,12:00:00.000,127251,35,255,2,8,FF80000000FFFFFF";
        let msg = parse(line).unwrap();
        assert_eq!(msg.pgn, 127251);
        assert_eq!(msg.data.len(), 8);
    }

    #[test]
    fn parses_csv2_data_row() {
        let line = "2026-01-01,12:00:00.000,127251,Rate of Turn,35,255,2,8,FF80000000FFFFFF";
        let msg = parse(line).unwrap();
        assert_eq!(msg.pgn, 127251);
        assert_eq!(msg.src, 35);
    }
}
