//! Textual raw-line dialect detection and parsing (Component E). A
//! dispatcher sniffs the first non-empty input line to pick a dialect, then
//! every subsequent line is parsed with that dialect's grammar.
mod actisense_ascii;
mod candump;
mod chetco_airmar;
mod garmin;
mod plain;
mod ydwg;

use crate::core::RawMessage;
use crate::error::RawLineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// PLAIN, FAST, and PLAIN_OR_FAST share one grammar; only the declared
    /// `len` field differs, and the parser branches on it per line.
    PlainOrFast,
    Chetco,
    Airmar,
    GarminCsv1,
    GarminCsv2,
    Ydwg02,
    ActisenseAscii,
    Candump,
}

/// Sniff the dialect from the first non-empty line of an input stream.
pub fn detect(line: &str) -> Option<Dialect> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line.starts_with("$PCDIN") {
        return Some(Dialect::Chetco);
    }
    if line.starts_with('-') {
        return Some(Dialect::Airmar);
    }
    if line.starts_with('A') && line[1..].chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return Some(Dialect::ActisenseAscii);
    }
    if garmin::looks_like_header(line) {
        return Some(if garmin::is_csv2(line) {
            Dialect::GarminCsv2
        } else {
            Dialect::GarminCsv1
        });
    }
    if ydwg::looks_like(line) {
        return Some(Dialect::Ydwg02);
    }
    if candump::looks_like(line) {
        return Some(Dialect::Candump);
    }
    if plain::looks_like(line) {
        return Some(Dialect::PlainOrFast);
    }
    None
}

/// Parse one line according to the already-detected dialect.
pub fn parse(dialect: Dialect, line: &str) -> Result<RawMessage, RawLineError> {
    let line = line.trim();
    match dialect {
        Dialect::PlainOrFast => plain::parse(line),
        Dialect::Chetco => chetco_airmar::parse_chetco(line),
        Dialect::Airmar => chetco_airmar::parse_airmar(line),
        Dialect::GarminCsv1 | Dialect::GarminCsv2 => garmin::parse(line),
        Dialect::Ydwg02 => ydwg::parse(line),
        Dialect::ActisenseAscii => actisense_ascii::parse(line),
        Dialect::Candump => candump::parse(line),
    }
}

/// Parse a lowercase-or-uppercase hex byte string into a `Vec<u8>`.
pub(crate) fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, RawLineError> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        return Err(RawLineError::Malformed(format!("odd-length hex string: {s}")));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(RawLineError::from))
        .collect()
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
