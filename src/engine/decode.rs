//! Generic PGN decoder: walks a static `PgnDescriptor` against a raw
//! payload and produces an ordered list of named field values, ready for
//! the renderer. Unlike a per-PGN typed struct, this stays entirely
//! data-driven so the catalog can grow without touching decoder code.
use crate::core::{FieldDescriptor, FieldKind, PgnDescriptor};
use crate::engine::bits::BitReader;
use crate::engine::sentinel::{self, Sentinel};
use crate::error::DecodeError;

/// One decoded field value, tagged with enough information for the
/// renderer to apply unit conversion, lookup names, and sentinel text.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Scaled floating-point measurement (resolution already applied).
    Number(f64),
    /// Unscaled integer (resolution is `0.0`, or a counter/PGN field).
    Integer(i64),
    /// Latitude/longitude in degrees.
    LatLon(f64),
    /// Raw lookup index plus its resolved name, when the catalog has one.
    Lookup { raw: u64, name: Option<&'static str> },
    /// Each bit of a bit-lookup field that is set, resolved to a name.
    BitLookup { raw: u64, names: Vec<&'static str> },
    /// Decoded text (string-fix/lz/lau/start-stop/6-bit ASCII).
    Text(String),
    /// Raw binary payload, rendered as hex.
    Binary(Vec<u8>),
    /// Field hit a reserved/unknown/error sentinel; carries the label.
    Sentinel(Sentinel),
}

#[derive(Debug, Clone)]
pub struct DecodedField {
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub value: FieldValue,
}

#[derive(Debug, Clone)]
pub struct DecodedPgn {
    pub pgn: u32,
    pub description: &'static str,
    pub fields: Vec<DecodedField>,
    pub repeating1: Vec<Vec<DecodedField>>,
    pub repeating2: Vec<Vec<DecodedField>>,
    /// `true` when the payload was shorter than the descriptor required;
    /// the caller renders what was decoded and marks the message incomplete.
    pub complete: bool,
}

/// Scratch state carried across fields within one message for PGN 126208's
/// variable-length command/request fields, which reference an earlier
/// field's declared bit width by (pgn, field index) rather than by a literal
/// bit count: the most recently decoded `Pgn`-kind field names the catalog
/// entry to consult, and the most recently decoded `Number`-kind field
/// ("Parameter Number") selects which of that entry's fields to size from.
#[derive(Debug, Default, Clone, Copy)]
pub struct VariableContext {
    pub referenced_pgn: Option<u32>,
    pub referenced_field_index: Option<usize>,
}

fn is_repeating_index(descriptor: &PgnDescriptor, idx: usize) -> bool {
    for rfs in descriptor.repeating1.iter().chain(descriptor.repeating2.iter()) {
        if idx >= rfs.start_field_index && idx < rfs.start_field_index + rfs.size {
            return true;
        }
    }
    false
}

fn sign_extend(raw: u64, bits: u32) -> i64 {
    if bits >= 64 {
        return raw as i64;
    }
    let sign_bit = 1u64 << (bits - 1);
    if raw & sign_bit != 0 {
        (raw | !((sign_bit << 1) - 1)) as i64
    } else {
        raw as i64
    }
}

/// Decode one scaled-number-shaped field (`Number`, `Pgn`, `Date`, `Time`,
/// lookup raw values): returns the raw unsigned bit pattern alongside the
/// classified sentinel, so the caller can branch on field kind afterward.
fn read_raw(reader: &mut BitReader, field: &FieldDescriptor) -> Result<(u64, Sentinel), DecodeError> {
    let raw = reader.read_u64(field.bits as u8)?;
    let max = sentinel::max_value(field.bits, field.is_signed);
    Ok((raw, sentinel::classify(raw, max)))
}

fn signed_value(raw: u64, bits: u32, offset: i64) -> i64 {
    if offset != 0 {
        raw as i64 + offset
    } else {
        sign_extend(raw, bits)
    }
}

fn decode_number(
    reader: &mut BitReader,
    field: &FieldDescriptor,
) -> Result<FieldValue, DecodeError> {
    let (raw, sentinel) = read_raw(reader, field)?;
    if !sentinel.is_valid() {
        return Ok(FieldValue::Sentinel(sentinel));
    }
    let signed = if field.is_signed {
        signed_value(raw, field.bits, field.offset)
    } else {
        raw as i64
    };
    if field.resolution != 0.0 {
        Ok(FieldValue::Number(signed as f64 * field.resolution))
    } else {
        Ok(FieldValue::Integer(signed))
    }
}

fn decode_lla(
    reader: &mut BitReader,
    field: &FieldDescriptor,
) -> Result<FieldValue, DecodeError> {
    let (raw, sentinel) = read_raw(reader, field)?;
    if !sentinel.is_valid() {
        return Ok(FieldValue::Sentinel(sentinel));
    }
    let signed = signed_value(raw, field.bits, field.offset);
    Ok(FieldValue::LatLon(signed as f64 * field.resolution))
}

fn decode_date(reader: &mut BitReader, field: &FieldDescriptor) -> Result<FieldValue, DecodeError> {
    let raw = reader.read_u64(field.bits as u8)?;
    if raw >= 0xFFFD {
        return Ok(FieldValue::Sentinel(Sentinel::Unknown));
    }
    Ok(FieldValue::Integer(raw as i64))
}

fn decode_time(reader: &mut BitReader, field: &FieldDescriptor) -> Result<FieldValue, DecodeError> {
    let raw = reader.read_u64(field.bits as u8)?;
    if raw >= 0xFFFF_FFFD {
        return Ok(FieldValue::Sentinel(Sentinel::Unknown));
    }
    let resolution = if field.resolution != 0.0 {
        field.resolution
    } else {
        0.0001
    };
    Ok(FieldValue::Number(raw as f64 * resolution))
}

fn decode_lookup(
    reader: &mut BitReader,
    field: &FieldDescriptor,
) -> Result<FieldValue, DecodeError> {
    let (raw, sentinel) = read_raw(reader, field)?;
    if !sentinel.is_valid() {
        return Ok(FieldValue::Sentinel(sentinel));
    }
    let name = field
        .lookup
        .and_then(crate::catalog::lookup::lookup_table)
        .and_then(|table| table.name_for(raw));
    Ok(FieldValue::Lookup { raw, name })
}

fn decode_bit_lookup(
    reader: &mut BitReader,
    field: &FieldDescriptor,
) -> Result<FieldValue, DecodeError> {
    let raw = reader.read_u64(field.bits as u8)?;
    let table = field.lookup.and_then(crate::catalog::lookup::lookup_table);
    let mut names = Vec::new();
    for bit in 0..field.bits {
        if raw & (1 << bit) != 0 {
            if let Some(name) = table.and_then(|t| t.name_for(bit as u64)) {
                names.push(name);
            }
        }
    }
    Ok(FieldValue::BitLookup { raw, names })
}

fn trim_string_padding(bytes: &[u8]) -> String {
    let trimmed_end = bytes
        .iter()
        .rposition(|&b| !matches!(b, 0xFF | b' ' | 0x00 | b'@'))
        .map(|p| p + 1)
        .unwrap_or(0);
    String::from_utf8_lossy(&bytes[..trimmed_end]).into_owned()
}

fn decode_string_fix(reader: &mut BitReader, field: &FieldDescriptor) -> Result<FieldValue, DecodeError> {
    let num_bytes = (field.bits / 8) as usize;
    let slice = reader.read_slice(num_bytes)?;
    Ok(FieldValue::Text(trim_string_padding(slice)))
}

fn decode_string_lz(reader: &mut BitReader) -> Result<FieldValue, DecodeError> {
    let len = reader.read_u8(8)? as usize;
    let slice = reader.read_slice(len)?;
    Ok(FieldValue::Text(trim_string_padding(slice)))
}

fn decode_string_lau(reader: &mut BitReader) -> Result<FieldValue, DecodeError> {
    let total_len = reader.read_u8(8)? as usize;
    if total_len == 0 {
        return Ok(FieldValue::Text(String::new()));
    }
    let _encoding = reader.read_u8(8)?;
    let payload_len = total_len.saturating_sub(1);
    let slice = reader.read_slice(payload_len)?;
    Ok(FieldValue::Text(trim_string_padding(slice)))
}

fn decode_string_start_stop(reader: &mut BitReader) -> Result<FieldValue, DecodeError> {
    let marker = reader.read_u8(8)?;
    if marker == 0x02 {
        let remaining = reader.read_remaining()?;
        let end = remaining
            .iter()
            .position(|&b| b == 0x01)
            .unwrap_or(remaining.len());
        return Ok(FieldValue::Text(trim_string_padding(&remaining[..end])));
    }
    // `<len>=marker` form: optional leading 0x01, then bytes.
    let len = marker as usize;
    let has_tag = reader.bits_remaining() / 8 >= len.saturating_sub(1) && len >= 1;
    let payload_len = if has_tag { len.saturating_sub(1) } else { len };
    if has_tag && len > 0 {
        let _tag = reader.read_u8(8)?;
    }
    let slice = reader.read_slice(payload_len)?;
    Ok(FieldValue::Text(trim_string_padding(slice)))
}

const SIX_BIT_ASCII: &[u8; 64] = b"@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^- !\"#$%&'()*+,-./0123456789:;<=>?";

fn decode_six_bit_ascii(reader: &mut BitReader, field: &FieldDescriptor) -> Result<FieldValue, DecodeError> {
    let chars = field.bits / 6;
    let mut text = String::with_capacity(chars as usize);
    for _ in 0..chars {
        let code = reader.read_u8(6)?;
        text.push(SIX_BIT_ASCII[(code & 0x3F) as usize] as char);
    }
    Ok(FieldValue::Text(text.trim_end().to_string()))
}

fn decode_binary(reader: &mut BitReader, field: &FieldDescriptor) -> Result<FieldValue, DecodeError> {
    if field.bits % 8 == 0 {
        let slice = reader.read_slice((field.bits / 8) as usize)?;
        Ok(FieldValue::Binary(slice.to_vec()))
    } else {
        let raw = reader.read_u64(field.bits.min(64) as u8)?;
        Ok(FieldValue::Binary(raw.to_le_bytes().to_vec()))
    }
}

/// Look up the bit width of the field that a PGN 126208-style `Variable`
/// field is standing in for: the PGN named by the most recently decoded
/// `Pgn`-kind field, indexed by the most recently decoded `Number`-kind
/// field ("Parameter Number"). Falls back to `None` (caller reads whatever
/// is left in the frame) when either half of the reference is missing or
/// the referenced PGN/field isn't catalogued.
fn resolve_variable_bits(ctx: &VariableContext) -> Option<u32> {
    let pgn = ctx.referenced_pgn?;
    // Parameter Number is 1-based (field 1 is the referenced PGN's first field).
    let field_index = ctx.referenced_field_index?.checked_sub(1)?;
    let descriptor = crate::catalog::lookup::find_descriptor_by_pgn(pgn)?;
    descriptor.fields.get(field_index).map(|f| f.bits)
}

fn decode_variable(
    reader: &mut BitReader,
    ctx: &VariableContext,
) -> Result<FieldValue, DecodeError> {
    let bits = resolve_variable_bits(ctx).unwrap_or(reader.bits_remaining() as u32);
    let raw = reader.read_u64(bits.clamp(1, 64) as u8)?;
    Ok(FieldValue::Integer(raw as i64))
}

fn decode_one_field(
    reader: &mut BitReader,
    field: &FieldDescriptor,
    ctx: &mut VariableContext,
) -> Result<Option<FieldValue>, DecodeError> {
    let value = match field.kind {
        FieldKind::Reserved | FieldKind::Spare => {
            reader.advance(field.bits)?;
            return Ok(None);
        }
        FieldKind::Number | FieldKind::Pgn => decode_number(reader, field)?,
        FieldKind::Lookup | FieldKind::IndirectLookup => decode_lookup(reader, field)?,
        FieldKind::BitLookup => decode_bit_lookup(reader, field)?,
        FieldKind::Date => decode_date(reader, field)?,
        FieldKind::Time => decode_time(reader, field)?,
        FieldKind::Lla32 | FieldKind::Lla64 => decode_lla(reader, field)?,
        FieldKind::StringFix => decode_string_fix(reader, field)?,
        FieldKind::StringLz => decode_string_lz(reader)?,
        FieldKind::StringLau => decode_string_lau(reader)?,
        FieldKind::StringStartStop => decode_string_start_stop(reader)?,
        FieldKind::SixBitAscii => decode_six_bit_ascii(reader, field)?,
        FieldKind::Binary => decode_binary(reader, field)?,
        FieldKind::Variable => decode_variable(reader, ctx)?,
    };
    match (field.kind, &value) {
        (FieldKind::Pgn, FieldValue::Integer(v)) => {
            ctx.referenced_pgn = Some((*v).max(0) as u32);
        }
        (FieldKind::Number, FieldValue::Integer(v)) => {
            ctx.referenced_field_index = Some((*v).max(0) as usize);
        }
        _ => {}
    }
    Ok(Some(value))
}

/// Extract the raw decoded integer of an already-decoded field, used to
/// resolve a repeating group's element count.
fn as_count(value: &FieldValue) -> Option<usize> {
    match value {
        FieldValue::Integer(v) => Some((*v).max(0) as usize),
        FieldValue::Number(v) => Some(v.max(0.0) as usize),
        _ => None,
    }
}

/// Decode `payload` against `descriptor`, producing an ordered field list
/// plus any repeating-group rows. Truncated payloads decode as much as
/// possible and come back with `complete: false` rather than erroring.
pub fn decode_pgn(descriptor: &'static PgnDescriptor, payload: &[u8]) -> Result<DecodedPgn, DecodeError> {
    let mut reader = BitReader::new(payload);
    let mut ctx = VariableContext::default();
    let mut fields = Vec::with_capacity(descriptor.fields.len());
    let mut raw_values: Vec<FieldValue> = Vec::with_capacity(descriptor.fields.len());
    let mut complete = true;

    for (idx, field) in descriptor.fields.iter().enumerate() {
        if is_repeating_index(descriptor, idx) {
            raw_values.push(FieldValue::Integer(0));
            continue;
        }
        match decode_one_field(&mut reader, field, &mut ctx) {
            Ok(Some(value)) => {
                raw_values.push(value.clone());
                fields.push(DecodedField {
                    name: field.name,
                    unit: field.unit,
                    value,
                });
            }
            Ok(None) => raw_values.push(FieldValue::Integer(0)),
            Err(DecodeError::BitReader(_)) => {
                complete = false;
                break;
            }
            Err(e) => return Err(e),
        }
    }

    let mut repeating1 = Vec::new();
    let mut repeating2 = Vec::new();
    if complete {
        for (rfs, out) in [
            (descriptor.repeating1, &mut repeating1),
            (descriptor.repeating2, &mut repeating2),
        ] {
            let Some(rfs) = rfs else { continue };
            let count = match rfs.count_field_index {
                Some(counter_idx) => raw_values
                    .get(counter_idx)
                    .and_then(as_count)
                    .ok_or(DecodeError::RepeatingCounterMissing)?,
                None => usize::MAX,
            };
            for _ in 0..count {
                if reader.bits_remaining() == 0 {
                    break;
                }
                let mut row = Vec::with_capacity(rfs.size);
                for offset in 0..rfs.size {
                    let field = &descriptor.fields[rfs.start_field_index + offset];
                    match decode_one_field(&mut reader, field, &mut ctx) {
                        Ok(Some(value)) => row.push(DecodedField {
                            name: field.name,
                            unit: field.unit,
                            value,
                        }),
                        Ok(None) => {}
                        Err(DecodeError::BitReader(_)) => {
                            complete = false;
                            break;
                        }
                        Err(e) => return Err(e),
                    }
                }
                if !complete {
                    break;
                }
                out.push(row);
            }
        }
    }

    Ok(DecodedPgn {
        pgn: descriptor.pgn,
        description: descriptor.description,
        fields,
        repeating1,
        repeating2,
        complete,
    })
}

#[cfg(test)]
#[path = "decode_tests.rs"]
mod tests;
