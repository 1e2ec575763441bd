//! Derives legacy NMEA 0183 sentences from a handful of decoded PGNs, for
//! consumers (chartplotters, autopilots) that only speak the older wire
//! format. Only the PGNs with an obvious 0183 counterpart are covered;
//! everything else passes through undecoded.
use crate::engine::decode::{DecodedPgn, FieldValue};

fn field<'a>(decoded: &'a DecodedPgn, name: &str) -> Option<&'a FieldValue> {
    decoded.fields.iter().find(|f| f.name == name).map(|f| &f.value)
}

fn as_f64(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(v) => Some(*v),
        FieldValue::Integer(v) => Some(*v as f64),
        FieldValue::LatLon(v) => Some(*v),
        _ => None,
    }
}

/// Append the `*HH\r\n` checksum trailer to a sentence body (without the
/// leading `$`/`!` or trailing checksum).
fn finish(talker_plus_body: String) -> String {
    let checksum = talker_plus_body.bytes().fold(0u8, |acc, b| acc ^ b);
    format!("${talker_plus_body}*{checksum:02X}\r\n")
}

fn lat_to_nmea(lat: f64) -> (String, char) {
    let hemi = if lat >= 0.0 { 'N' } else { 'S' };
    let lat = lat.abs();
    let deg = lat.trunc() as u32;
    let min = (lat - deg as f64) * 60.0;
    (format!("{deg:02}{min:07.4}"), hemi)
}

fn lon_to_nmea(lon: f64) -> (String, char) {
    let hemi = if lon >= 0.0 { 'E' } else { 'W' };
    let lon = lon.abs();
    let deg = lon.trunc() as u32;
    let min = (lon - deg as f64) * 60.0;
    (format!("{deg:03}{min:07.4}"), hemi)
}

/// Derive a 0183 sentence for `decoded`, if one of the covered PGNs, using
/// `talker_id` (e.g. `"GP"`) as the two-letter prefix.
pub fn derive(talker_id: &str, decoded: &DecodedPgn) -> Option<String> {
    match decoded.pgn {
        129025 => derive_gll(talker_id, decoded),
        127250 => derive_hdg(talker_id, decoded),
        128259 => derive_vhw(talker_id, decoded),
        127251 => derive_rot(talker_id, decoded),
        128267 => derive_dpt(talker_id, decoded),
        130306 => derive_mwv(talker_id, decoded),
        _ => None,
    }
}

/// The NMEA 0183 sentence type `derive` would produce for `pgn`, used as the
/// rate limiter's key without having to derive the sentence first.
pub fn sentence_kind(pgn: u32) -> Option<&'static str> {
    match pgn {
        129025 => Some("GLL"),
        127250 => Some("HDG"),
        128259 => Some("VHW"),
        127251 => Some("ROT"),
        128267 => Some("DPT"),
        130306 => Some("MWV"),
        _ => None,
    }
}

fn derive_gll(talker: &str, decoded: &DecodedPgn) -> Option<String> {
    let lat = as_f64(field(decoded, "Latitude")?)?;
    let lon = as_f64(field(decoded, "Longitude")?)?;
    let (lat_s, lat_h) = lat_to_nmea(lat);
    let (lon_s, lon_h) = lon_to_nmea(lon);
    Some(finish(format!("{talker}GLL,{lat_s},{lat_h},{lon_s},{lon_h},,A")))
}

fn derive_hdg(talker: &str, decoded: &DecodedPgn) -> Option<String> {
    let heading = as_f64(field(decoded, "Heading")?)?.to_degrees();
    Some(finish(format!("{talker}HDG,{heading:.1},,,,")))
}

fn derive_vhw(talker: &str, decoded: &DecodedPgn) -> Option<String> {
    let speed_ms = as_f64(field(decoded, "Speed Water Referenced")?)?;
    let knots = speed_ms * 1.943_844_5;
    Some(finish(format!("{talker}VHW,,,,,{knots:.2},N,,K")))
}

fn derive_rot(talker: &str, decoded: &DecodedPgn) -> Option<String> {
    let rate = as_f64(field(decoded, "Rate")?)?.to_degrees() * 60.0;
    Some(finish(format!("{talker}ROT,{rate:.1},A")))
}

fn derive_dpt(talker: &str, decoded: &DecodedPgn) -> Option<String> {
    let depth = as_f64(field(decoded, "Depth")?)?;
    Some(finish(format!("{talker}DPT,{depth:.2},0.0")))
}

fn derive_mwv(talker: &str, decoded: &DecodedPgn) -> Option<String> {
    let angle = as_f64(field(decoded, "Wind Angle")?)?.to_degrees();
    let speed = as_f64(field(decoded, "Wind Speed")?)?;
    Some(finish(format!("{talker}MWV,{angle:.1},R,{speed:.1},M,A")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::decode::DecodedField;

    fn pgn_with(pgn: u32, fields: Vec<DecodedField>) -> DecodedPgn {
        DecodedPgn {
            pgn,
            description: "test",
            fields,
            repeating1: vec![],
            repeating2: vec![],
            complete: true,
        }
    }

    #[test]
    fn derives_gll_with_valid_checksum() {
        let decoded = pgn_with(
            129025,
            vec![
                DecodedField { name: "Latitude", unit: None, value: FieldValue::LatLon(45.5) },
                DecodedField { name: "Longitude", unit: None, value: FieldValue::LatLon(-122.25) },
            ],
        );
        let sentence = derive("GP", &decoded).unwrap();
        assert!(sentence.starts_with("$GPGLL,"));
        let body = sentence.trim_end().strip_prefix('$').unwrap();
        let (body, checksum_hex) = body.split_once('*').unwrap();
        let expected: u8 = body.bytes().fold(0, |acc, b| acc ^ b);
        assert_eq!(u8::from_str_radix(checksum_hex, 16).unwrap(), expected);
    }

    #[test]
    fn unrecognised_pgn_derives_nothing() {
        let decoded = pgn_with(999999, vec![]);
        assert!(derive("GP", &decoded).is_none());
    }

    #[test]
    fn missing_required_field_derives_nothing() {
        let decoded = pgn_with(129025, vec![]);
        assert!(derive("GP", &decoded).is_none());
    }
}
