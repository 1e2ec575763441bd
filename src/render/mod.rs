//! Text and JSON rendering of decoded PGNs (Component F). The same
//! `DecodedPgn` feeds either renderer; what differs is which fields a
//! `RenderContext` suppresses, how lookups and sentinels are labelled, and
//! which unit system numeric fields come out in.
pub mod clock;

use serde_json::{json, Map, Value};

use crate::config::{GeoFormat, OutputFormat, RenderContext};
use crate::core::RawMessage;
use crate::engine::decode::{DecodedField, DecodedPgn, FieldValue};
use crate::engine::sentinel::Sentinel;

/// Render one decoded message as the configured output format.
pub fn render(ctx: &RenderContext, raw: &RawMessage, decoded: &DecodedPgn) -> String {
    match ctx.format {
        OutputFormat::Json => render_json(ctx, raw, decoded).to_string(),
        OutputFormat::Text => render_text(ctx, raw, decoded),
    }
}

fn render_json(ctx: &RenderContext, raw: &RawMessage, decoded: &DecodedPgn) -> Value {
    let mut obj = Map::new();
    obj.insert("timestamp".into(), json!(raw.timestamp));
    obj.insert("prio".into(), json!(raw.priority));
    obj.insert("src".into(), json!(raw.src));
    obj.insert("dst".into(), json!(raw.dst));
    obj.insert("pgn".into(), json!(decoded.pgn));
    obj.insert("description".into(), json!(decoded.description));
    if !decoded.complete {
        obj.insert("incomplete".into(), json!(true));
    }
    if ctx.include_raw_data {
        obj.insert("data".into(), json!(hex_encode(&raw.data)));
    }

    let mut fields = Map::new();
    for field in &decoded.fields {
        if let Some((key, value)) = json_field(ctx, field) {
            fields.insert(key, value);
        }
    }
    obj.insert("fields".into(), Value::Object(fields));

    if !decoded.repeating1.is_empty() {
        obj.insert("list".into(), json_rows(ctx, &decoded.repeating1));
    }
    if !decoded.repeating2.is_empty() {
        obj.insert("list2".into(), json_rows(ctx, &decoded.repeating2));
    }

    Value::Object(obj)
}

fn json_rows(ctx: &RenderContext, rows: &[Vec<DecodedField>]) -> Value {
    Value::Array(
        rows.iter()
            .map(|row| {
                let mut m = Map::new();
                for field in row {
                    if let Some((key, value)) = json_field(ctx, field) {
                        m.insert(key, value);
                    }
                }
                Value::Object(m)
            })
            .collect(),
    )
}

/// Render one field to its JSON key/value, or `None` when it should be
/// omitted (a reserved/spare sentinel outside `-empty` mode).
fn json_field(ctx: &RenderContext, field: &DecodedField) -> Option<(String, Value)> {
    let name = ctx.format_field_name(field.name);
    match &field.value {
        FieldValue::Sentinel(s) if !ctx.show_empty && !matches!(s, Sentinel::Valid) => None,
        FieldValue::Sentinel(s) => Some((name, json!(sentinel_label(*s)))),
        FieldValue::Number(n) => Some((name, json!(convert_unit(ctx, field.unit, *n)))),
        FieldValue::Integer(n) => Some((name, json!(n))),
        FieldValue::LatLon(degrees) => Some((name, render_geo(ctx, *degrees))),
        FieldValue::Lookup { raw, name: label } => Some((name, render_lookup(ctx, *raw, *label))),
        FieldValue::BitLookup { raw, names } => {
            Some((name, json!({ "raw": raw, "names": names })))
        }
        FieldValue::Text(s) => Some((name, json!(s))),
        FieldValue::Binary(bytes) => Some((name, json!(hex_encode(bytes)))),
    }
}

fn render_lookup(ctx: &RenderContext, raw: u64, label: Option<&'static str>) -> Value {
    if ctx.name_value {
        json!({ "value": raw, "name": label })
    } else {
        json!(label.unwrap_or("UNKNOWN"))
    }
}

/// `-si` renders angles in radians, as the wire already does; human mode
/// converts to degrees. Other SI conversions (energy, charge) are applied
/// the same way, keyed off the field's declared unit string.
fn convert_unit(ctx: &RenderContext, unit: Option<&'static str>, value: f64) -> f64 {
    match (ctx.si_units, unit) {
        (false, Some("rad")) => value.to_degrees(),
        (false, Some("rad/s")) => value.to_degrees(),
        (true, Some("deg")) => value.to_radians(),
        (false, Some("J")) => value,
        (true, Some("kWh")) => value * 3_600_000.0,
        _ => value,
    }
}

/// Geo fields always carry a `_dd` (decimal degrees) sibling regardless of
/// the configured display format, so downstream consumers can rely on it.
fn render_geo(ctx: &RenderContext, degrees: f64) -> Value {
    match ctx.geo_format {
        GeoFormat::Dd => json!(degrees),
        GeoFormat::Dm => json!({ "_dd": degrees, "dm": to_degrees_minutes(degrees) }),
        GeoFormat::Dms => json!({ "_dd": degrees, "dms": to_degrees_minutes_seconds(degrees) }),
    }
}

fn to_degrees_minutes(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let value = value.abs();
    let deg = value.trunc();
    let min = (value - deg) * 60.0;
    format!("{sign}{deg:.0}\u{b0}{min:.4}'")
}

fn to_degrees_minutes_seconds(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let value = value.abs();
    let deg = value.trunc();
    let min_full = (value - deg) * 60.0;
    let min = min_full.trunc();
    let sec = (min_full - min) * 60.0;
    format!("{sign}{deg:.0}\u{b0}{min:.0}'{sec:.2}\"")
}

fn sentinel_label(s: Sentinel) -> &'static str {
    s.label()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

fn render_text(ctx: &RenderContext, raw: &RawMessage, decoded: &DecodedPgn) -> String {
    let mut out = format!(
        "{} {} {} {} {} {}:",
        raw.timestamp, raw.priority, decoded.pgn, raw.src, raw.dst, decoded.description
    );
    for field in &decoded.fields {
        if let Some(text) = text_field(ctx, field) {
            out.push(ctx.separator);
            out.push(' ');
            out.push_str(&text);
        }
    }
    if !decoded.complete {
        out.push_str(" (incomplete)");
    }
    out
}

fn text_field(ctx: &RenderContext, field: &DecodedField) -> Option<String> {
    let name = ctx.format_field_name(field.name);
    let value = match &field.value {
        FieldValue::Sentinel(s) if !ctx.show_empty && !matches!(s, Sentinel::Valid) => return None,
        FieldValue::Sentinel(s) => s.label().to_string(),
        FieldValue::Number(n) => format!("{}", convert_unit(ctx, field.unit, *n)),
        FieldValue::Integer(n) => n.to_string(),
        FieldValue::LatLon(d) => format!("{d}"),
        FieldValue::Lookup { raw, name } => name.map(str::to_string).unwrap_or_else(|| raw.to_string()),
        FieldValue::BitLookup { names, .. } => names.join("+"),
        FieldValue::Text(s) => s.clone(),
        FieldValue::Binary(bytes) => hex_encode(bytes),
    };
    Some(format!("{name} = {value}"))
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
