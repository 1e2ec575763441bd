//! Defines the data contract between `build.rs` (the generator) and the
//! decoding engine (the interpreter).
//!
//! `build.rs` turns the bundled CANboat-style JSON catalog into static
//! descriptors that implement this contract; `engine::decode` walks them to
//! turn a raw payload into named, typed values.

/// Maximum payload size a reassembled Fast-Packet message can carry.
pub const MAX_PGN_BYTES: usize = 223;

/// A single decoded CAN-level frame, or a fully reassembled multi-frame PGN,
/// flowing between the frame codec, the reassembler, and the raw-line
/// parser/renderer. This is the common currency of the whole pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    /// ISO-8601 string with millisecond precision.
    pub timestamp: String,
    pub priority: u8,
    pub pgn: u32,
    pub src: u8,
    pub dst: u8,
    pub data: Vec<u8>,
}

/// Semantic type of a field within a PGN, mirroring CANboat's `FieldType`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FieldKind {
    /// Signed or unsigned scaled integer; `is_signed` carries the distinction.
    Number,
    /// Value is an index into a dedicated enumeration.
    Lookup,
    /// Lookup resolved through another field's value (high/low byte pair).
    IndirectLookup,
    /// Bitfield where each individual bit indexes into an enumeration.
    BitLookup,
    /// Encodes a PGN number (used by request/command messages).
    Pgn,
    /// Days since 1970-01-01 UTC.
    Date,
    /// Seconds since midnight UTC, 0.0001 s resolution.
    Time,
    /// 32-bit latitude/longitude, 1e-7 degree resolution.
    Lla32,
    /// 64-bit latitude/longitude, 1e-16 degree resolution.
    Lla64,
    /// Fixed-length ASCII string, right-trimmed of padding.
    StringFix,
    /// `<len> <bytes> 0x00` variable-length string.
    StringLz,
    /// `<len> <encoding> <bytes>` variable-length string.
    StringLau,
    /// `0x02 <bytes> 0x01` (or length-prefixed) variable-length string.
    StringStartStop,
    /// AIS-style 6-bit packed text.
    SixBitAscii,
    /// Raw binary block.
    Binary,
    /// Field's definition is resolved at runtime from an earlier field
    /// (PGN 126208 request/command).
    Variable,
    /// Reserved bits, ignored on read.
    Reserved,
    /// Spare bits, zero-filled.
    Spare,
}

/// Describes a repeating field set within a PGN payload.
#[derive(Debug, Clone, Copy)]
pub struct RepeatingFieldSet {
    /// Index of the field that carries the repetition count. `None` means
    /// the repetition runs until the payload is exhausted.
    pub count_field_index: Option<usize>,
    /// Index of the first field in the repeating group.
    pub start_field_index: usize,
    /// Number of consecutive fields making up one repetition.
    pub size: usize,
}

/// Fixed-value discriminator used to distinguish PGN variants that share a
/// single PGN number.
#[derive(Debug, Clone, Copy)]
pub struct MatchField {
    /// Index of the field whose decoded raw value must equal `value`.
    pub field_index: usize,
    pub value: u64,
}

/// Descriptor for a single PGN field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    pub bits: u32,
    pub is_signed: bool,
    /// Scale factor; `0.0` means "no resolution, raw integer".
    pub resolution: f64,
    /// Excess-K / J1939 offset bias applied to signed values (`0` = sign-extend instead).
    pub offset: i64,
    /// Name of the enumeration to consult for `Lookup`/`IndirectLookup`/`BitLookup`.
    pub lookup: Option<&'static str>,
    pub unit: Option<&'static str>,
}

/// Transport shape of a PGN, per the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgnType {
    Single,
    Fast,
    IsoTp,
    Mixed,
}

/// One PGN definition: a static, process-wide immutable entry in the catalog.
#[derive(Debug, Clone, Copy)]
pub struct PgnDescriptor {
    pub pgn: u32,
    pub description: &'static str,
    pub pgn_type: PgnType,
    pub fields: &'static [FieldDescriptor],
    pub repeating1: Option<RepeatingFieldSet>,
    pub repeating2: Option<RepeatingFieldSet>,
    pub match_fields: &'static [MatchField],
    /// Catch-all entry for this PGN's PDU range, used when no more specific
    /// definition's `match_fields` are satisfied.
    pub fallback: bool,
}

/// A single enumeration table entry: raw value paired with its display name.
#[derive(Debug, Clone, Copy)]
pub struct LookupEntry {
    pub value: u64,
    pub name: &'static str,
}

/// A named enumeration (`Lookup`, `IndirectLookup`, or `BitLookup` target).
#[derive(Debug, Clone, Copy)]
pub struct LookupTable {
    pub name: &'static str,
    pub entries: &'static [LookupEntry],
}

impl LookupTable {
    pub fn name_for(&self, value: u64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.name)
    }
}
