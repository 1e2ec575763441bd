//! Explicit render/runtime context, replacing the CLI-flags-as-globals
//! pattern spec §9 calls out: mode flags, current output separator, and
//! geographic/unit/casing preferences travel as a struct through the
//! decoder API instead of living in module-level statics.

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GeoFormat {
    Dd,
    Dm,
    Dms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FieldNameCase {
    Original,
    Camel,
    UpperCamel,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Everything that influences how a decoded PGN is rendered. Built once at
/// startup from CLI flags and threaded explicitly through the decoder and
/// renderer; never stored in a global.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub format: OutputFormat,
    /// `-empty`: render missing/sentinel values as JSON `null` instead of omitting them.
    pub show_empty: bool,
    /// `-nv`: render lookup values as `{"value": N, "name": "..."}`.
    pub name_value: bool,
    /// `-si`: use SI units (radians, MJ, coulombs) instead of human units.
    pub si_units: bool,
    pub geo_format: GeoFormat,
    pub field_case: FieldNameCase,
    /// `-data`: include the raw hex payload alongside decoded fields.
    pub include_raw_data: bool,
    /// Text-mode field separator.
    pub separator: char,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            show_empty: false,
            name_value: false,
            si_units: false,
            geo_format: GeoFormat::Dd,
            field_case: FieldNameCase::Original,
            include_raw_data: false,
            separator: ',',
        }
    }
}

impl RenderContext {
    pub fn format_field_name(&self, name: &str) -> String {
        match self.field_case {
            FieldNameCase::Original => name.to_string(),
            FieldNameCase::Camel => to_camel_case(name, false),
            FieldNameCase::UpperCamel => to_camel_case(name, true),
        }
    }
}

fn to_camel_case(name: &str, upper_first: bool) -> String {
    let mut out = String::with_capacity(name.len());
    let mut capitalize_next = upper_first;
    for c in name.chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            capitalize_next = true;
            continue;
        }
        if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_preserves_words() {
        assert_eq!(to_camel_case("Wind Speed", false), "windSpeed");
        assert_eq!(to_camel_case("Wind Speed", true), "WindSpeed");
    }
}
