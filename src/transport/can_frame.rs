//! In-memory representation of a single SAE J1939 / NMEA 2000 CAN frame,
//! as handed to the fast-packet reassembler or emitted by the raw-line
//! parsers for single-frame dialects.
use crate::transport::can_id::CanId;

#[derive(Clone, Debug)]
pub struct CanFrame {
    /// Full 29-bit CAN identifier.
    pub id: CanId,
    /// Payload buffer. Classic CAN frames always provide eight bytes.
    pub data: [u8; 8],
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: usize,
}

impl CanFrame {
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }
}
