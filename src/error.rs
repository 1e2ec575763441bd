//! Error definitions shared across library modules. Each type models a
//! specific failure scenario (framing, reassembly, decoding, rendering,
//! the n2kd state map); see spec §7 for the policy attached to each kind.
use thiserror::Error;

use crate::core::FieldKind;

#[derive(Error, Debug)]
/// Bit-level read failures (see `engine::bits::BitReader`).
pub enum BitReaderError {
    #[error("attempted to read out of bounds: asked {asked} bits, {available} available")]
    OutOfBounds { asked: usize, available: usize },
    #[error("cannot read more than {max} bits into this integer type, asked {asked}")]
    TooLongForType { max: u8, asked: u8 },
    #[error("slice read requires byte alignment, cursor at bit {cursor}")]
    NonAlignedBit { cursor: usize },
}

#[derive(Error, Debug)]
/// Errors raised while decoding a payload against a `PgnDescriptor`.
pub enum DecodeError {
    #[error("payload too short for descriptor: {0}")]
    BitReader(#[from] BitReaderError),
    #[error("field kind {0:?} is not supported by the decoder")]
    UnsupportedFieldKind(FieldKind),
    #[error("unknown lookup table {0:?}")]
    UnknownLookup(&'static str),
    #[error("repeating field set has no counter field and is unsupported in this context")]
    RepeatingCounterMissing,
    #[error("variable field referenced PGN {pgn} field #{field} which was never seen")]
    VariableReferenceMissing { pgn: u32, field: usize },
    #[error("announced size {0} exceeds the maximum supported reassembled payload")]
    PayloadTooLarge(usize),
}

#[derive(Error, Debug)]
/// Errors raised while looking up a PGN definition for a raw payload.
pub enum CatalogError {
    #[error("no catalog entry matches PGN {0}")]
    NoMatch(u32),
}

#[derive(Error, Debug)]
/// Frame-level (NGT-1/iKonvert) failures. Framing errors are logged and the
/// state machine resynchronises; they never abort the process (spec §7).
pub enum FrameError {
    #[error("checksum mismatch: computed {computed:#04x}, received {received:#04x}")]
    BadChecksum { computed: u8, received: u8 },
    #[error("unexpected byte {0:#04x} following DLE escape")]
    UnexpectedEscape(u8),
    #[error("message truncated before ETX")]
    Truncated,
    #[error("unrecognised command byte {0:#04x}")]
    UnknownCommand(u8),
    #[error("iKonvert line is not valid UTF-8 or is malformed: {0}")]
    MalformedLine(String),
    #[error("base64 payload could not be decoded: {0}")]
    Base64(#[from] base64::DecodeError),
}

#[derive(Error, Debug)]
/// Errors raised while parsing a textual raw-line input dialect.
pub enum RawLineError {
    #[error("line did not match any known dialect")]
    UnknownDialect,
    #[error("malformed field in line: {0}")]
    Malformed(String),
    #[error("failed to parse integer field: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
    #[error("failed to parse timestamp: {0}")]
    ParseTimestamp(String),
}

#[derive(Error, Debug)]
/// Internal invariant violations: logged and the offending message dropped,
/// the process continues (spec §7, "Internal invariant").
pub enum InternalError {
    #[error("fast-packet reassembly pool exhausted ({0} slots in use)")]
    PoolExhausted(usize),
    #[error("catalog inconsistency: {0}")]
    CatalogInconsistent(String),
}

#[derive(Error, Debug)]
/// Top-level error returned by binaries; mapped to the exit codes in spec §6.
pub enum AppError {
    #[error("usage error: {0}")]
    Usage(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    RawLine(#[from] RawLineError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Internal(#[from] InternalError),
    #[error("fatal: {0}")]
    Fatal(String),
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl AppError {
    /// Exit code contract from spec §6: 1 usage, 2 fatal, 3 malformed input.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage(_) => 1,
            AppError::MalformedInput(_) => 3,
            _ => 2,
        }
    }
}
