//! Fast-Packet reassembly: merges a sequence of 8-byte CAN frames carrying a
//! single PGN too large to fit in one frame back into a contiguous payload.
//!
//! Frame 0 carries the total announced length and 6 payload bytes; frames 1..
//! carry 7 payload bytes each. The pool tolerates out-of-order delivery
//! (YDWG gateways routinely reorder frames within a sequence) by tracking
//! received frames with a bitmask rather than a monotonic counter.
use crate::core::MAX_PGN_BYTES;
use crate::error::InternalError;
use crate::transport::can_frame::CanFrame;

const POOL_SIZE: usize = 64;

#[derive(Clone)]
struct Slot {
    used: bool,
    src: u8,
    pgn: u32,
    size: usize,
    frames_received: u32,
    all_frames: u32,
    data: [u8; MAX_PGN_BYTES],
}

impl Slot {
    fn empty() -> Self {
        Self {
            used: false,
            src: 0,
            pgn: 0,
            size: 0,
            frames_received: 0,
            all_frames: 0,
            data: [0; MAX_PGN_BYTES],
        }
    }
}

/// Outcome of feeding one frame into the pool.
pub enum Progress {
    /// The message is still awaiting more frames.
    Pending,
    /// All frames arrived; the message is ready for decoding.
    Complete { pgn: u32, src: u8, payload: Vec<u8> },
}

/// Fixed-size reassembly pool keyed by `(src, pgn)`.
pub struct FastPacketPool {
    slots: Vec<Slot>,
}

impl Default for FastPacketPool {
    fn default() -> Self {
        Self::new()
    }
}

impl FastPacketPool {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot::empty(); POOL_SIZE],
        }
    }

    fn find_slot(&self, src: u8, pgn: u32) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.used && s.src == src && s.pgn == pgn)
    }

    fn allocate(&mut self, src: u8, pgn: u32) -> Result<usize, InternalError> {
        let idx = self
            .slots
            .iter()
            .position(|s| !s.used)
            .ok_or(InternalError::PoolExhausted(POOL_SIZE))?;
        self.slots[idx] = Slot {
            used: true,
            src,
            pgn,
            ..Slot::empty()
        };
        Ok(idx)
    }

    /// Feed one CAN frame (payload 1..=8 bytes) known to belong to `pgn`.
    pub fn ingest(&mut self, pgn: u32, frame: &CanFrame) -> Result<Progress, InternalError> {
        let src = frame.id.source_address();
        let payload = frame.payload();
        if payload.is_empty() {
            return Ok(Progress::Pending);
        }

        let seq_frame = payload[0];
        let frame_index = seq_frame & 0x1F;

        let idx = match self.find_slot(src, pgn) {
            Some(idx) if frame_index == 0 => {
                // A fresh frame-0 while a message is pending aborts and restarts.
                self.slots[idx] = Slot {
                    used: true,
                    src,
                    pgn,
                    ..Slot::empty()
                };
                idx
            }
            Some(idx) => idx,
            None => self.allocate(src, pgn)?,
        };

        let slot = &mut self.slots[idx];

        if frame_index == 0 {
            let total_size = payload.get(1).copied().unwrap_or(0) as usize;
            slot.size = total_size;
            let frame_count = 1 + total_size.saturating_sub(6).div_ceil(7);
            slot.all_frames = if frame_count >= 32 {
                u32::MAX
            } else {
                (1u32 << frame_count) - 1
            };
            let chunk = &payload[2.min(payload.len())..];
            let end = chunk.len().min(slot.data.len());
            slot.data[..end].copy_from_slice(&chunk[..end]);
        } else {
            let offset = 6 + (frame_index as usize - 1) * 7;
            let chunk = &payload[1.min(payload.len())..];
            if offset < slot.data.len() {
                let end = (offset + chunk.len()).min(slot.data.len());
                let take = end - offset;
                slot.data[offset..end].copy_from_slice(&chunk[..take]);
            }
        }

        let bit = 1u32 << frame_index;
        if slot.frames_received & bit != 0 {
            // Duplicate / out-of-sync frame bit: treat as a reassembly error
            // for this PGN+src pair and restart the slot.
            slot.frames_received = 0;
            return Err(InternalError::CatalogInconsistent(format!(
                "duplicate fast-packet frame {frame_index} for pgn {pgn} src {src}"
            )));
        }
        slot.frames_received |= bit;

        if slot.all_frames != 0 && slot.frames_received == slot.all_frames {
            let payload = slot.data[..slot.size].to_vec();
            slot.used = false;
            return Ok(Progress::Complete { pgn, src, payload });
        }

        Ok(Progress::Pending)
    }
}

#[cfg(test)]
#[path = "fastpacket_tests.rs"]
mod tests;
