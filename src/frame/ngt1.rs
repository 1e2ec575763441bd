//! Actisense NGT-1 framing: `DLE STX <cmd> <len> <payload…> <crc> DLE ETX`,
//! with `DLE` doubled inside the framed body and collapsed on receive. Also
//! understands the EBL log-file header record (`DLE SOH … DLE LF`) that
//! carries an absolute Windows `FILETIME` for log replay.
use crate::error::FrameError;

const DLE: u8 = 0x10;
const STX: u8 = 0x02;
const ETX: u8 = 0x03;
const SOH: u8 = 0x01;
const LF: u8 = 0x0A;

pub const N2K_MSG_RECEIVED: u8 = 0x93;
pub const N2K_MSG_SEND: u8 = 0x94;
pub const NGT_MSG_RECEIVED: u8 = 0xA0;
pub const NGT_MSG_SEND: u8 = 0xA1;

/// Synthetic PGN range used to carry Actisense-internal (non-N2K) messages
/// through the same pipeline as real CAN traffic.
pub const ACTISENSE_BEM: u32 = 0x40000;

/// Tag byte that introduces an absolute-timestamp header record in an EBL file.
const EBL_TIMESTAMP_TAG: u8 = 0x01;

#[derive(Debug, Clone, PartialEq)]
pub struct N2kMessage {
    pub priority: u8,
    pub pgn: u32,
    pub dst: u8,
    pub src: u8,
    /// Gateway-local timestamp (milliseconds, device-relative).
    pub timestamp: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    N2kReceived(N2kMessage),
    /// Device-internal status/info message, not real N2K traffic.
    NgtReceived { pgn: u32, payload: Vec<u8> },
    /// Windows `FILETIME` (100ns ticks since 1601-01-01 UTC), little-endian.
    EblTimestamp(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    SawDle,
    InMessage,
    SawDleInMessage,
    InHeader,
    SawDleInHeader,
}

/// Byte-at-a-time state machine decoding the NGT-1 wire format.
pub struct Decoder {
    state: State,
    buffer: Vec<u8>,
    header: Vec<u8>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            buffer: Vec::new(),
            header: Vec::new(),
        }
    }

    /// Feed one byte. Returns `Some(event)` when a complete message or
    /// header record was delivered; a `FrameError` means the current
    /// message/header was dropped and decoding resynchronises at `Idle`.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Event>, FrameError> {
        match self.state {
            State::Idle => {
                if byte == DLE {
                    self.state = State::SawDle;
                }
                Ok(None)
            }
            State::SawDle => match byte {
                STX => {
                    self.buffer.clear();
                    self.state = State::InMessage;
                    Ok(None)
                }
                SOH => {
                    self.header.clear();
                    self.state = State::InHeader;
                    Ok(None)
                }
                other => {
                    self.state = State::Idle;
                    Err(FrameError::UnexpectedEscape(other))
                }
            },
            State::InMessage => {
                if byte == DLE {
                    self.state = State::SawDleInMessage;
                } else {
                    self.buffer.push(byte);
                }
                Ok(None)
            }
            State::SawDleInMessage => match byte {
                DLE => {
                    self.buffer.push(DLE);
                    self.state = State::InMessage;
                    Ok(None)
                }
                ETX => {
                    self.state = State::Idle;
                    self.deliver_message()
                }
                other => {
                    self.state = State::Idle;
                    Err(FrameError::UnexpectedEscape(other))
                }
            },
            State::InHeader => {
                if byte == DLE {
                    self.state = State::SawDleInHeader;
                } else {
                    self.header.push(byte);
                }
                Ok(None)
            }
            State::SawDleInHeader => match byte {
                LF => {
                    self.state = State::Idle;
                    self.deliver_header()
                }
                other => {
                    self.state = State::Idle;
                    Err(FrameError::UnexpectedEscape(other))
                }
            },
        }
    }

    fn deliver_message(&mut self) -> Result<Option<Event>, FrameError> {
        if self.buffer.len() < 3 {
            return Err(FrameError::Truncated);
        }
        let cmd = self.buffer[0];
        let len = self.buffer[1] as usize;
        if self.buffer.len() != 2 + len + 1 {
            return Err(FrameError::Truncated);
        }
        let payload = &self.buffer[2..2 + len];
        let received_crc = self.buffer[2 + len];
        let sum: u32 = cmd as u32 + len as u32 + payload.iter().map(|&b| b as u32).sum::<u32>();
        let computed = (256 - (sum % 256)) % 256;
        if computed as u8 != received_crc {
            return Err(FrameError::BadChecksum {
                computed: computed as u8,
                received: received_crc,
            });
        }

        match cmd {
            N2K_MSG_RECEIVED => {
                if payload.len() < 11 {
                    return Err(FrameError::Truncated);
                }
                let priority = payload[0];
                let pgn = u32::from_le_bytes([payload[1], payload[2], payload[3], 0]);
                let dst = payload[4];
                let src = payload[5];
                let timestamp = u32::from_le_bytes([payload[6], payload[7], payload[8], payload[9]]);
                let data_len = payload[10] as usize;
                let data = payload.get(11..11 + data_len).unwrap_or(&[]).to_vec();
                Ok(Some(Event::N2kReceived(N2kMessage {
                    priority,
                    pgn,
                    dst,
                    src,
                    timestamp,
                    data,
                })))
            }
            NGT_MSG_RECEIVED => Ok(Some(Event::NgtReceived {
                pgn: ACTISENSE_BEM,
                payload: payload.to_vec(),
            })),
            other => Err(FrameError::UnknownCommand(other)),
        }
    }

    fn deliver_header(&mut self) -> Result<Option<Event>, FrameError> {
        if self.header.len() != 9 || self.header[0] != EBL_TIMESTAMP_TAG {
            return Err(FrameError::Truncated);
        }
        let bytes: [u8; 8] = self.header[1..9].try_into().unwrap();
        Ok(Some(Event::EblTimestamp(u64::from_le_bytes(bytes))))
    }
}

/// Build an outbound `DLE STX <cmd> <len> <payload…> <crc> DLE ETX` frame,
/// doubling every `DLE` byte in `cmd|len|payload|crc`.
pub fn encode_frame(cmd: u8, payload: &[u8]) -> Vec<u8> {
    let len = payload.len() as u8;
    let sum: u32 = cmd as u32 + len as u32 + payload.iter().map(|&b| b as u32).sum::<u32>();
    let crc = ((256 - (sum % 256)) % 256) as u8;

    let mut body = Vec::with_capacity(payload.len() + 3);
    body.push(cmd);
    body.push(len);
    body.extend_from_slice(payload);
    body.push(crc);

    let mut out = Vec::with_capacity(body.len() * 2 + 4);
    out.push(DLE);
    out.push(STX);
    for b in body {
        out.push(b);
        if b == DLE {
            out.push(DLE);
        }
    }
    out.push(DLE);
    out.push(ETX);
    out
}

/// Build an outbound `N2K_MSG_SEND` frame. Omits the receive-only
/// `timestamp`/`src` fields per the wire contract.
pub fn encode_n2k_send(priority: u8, pgn: u32, dst: u8, data: &[u8]) -> Vec<u8> {
    let pgn_bytes = pgn.to_le_bytes();
    let mut payload = Vec::with_capacity(5 + data.len());
    payload.push(priority);
    payload.extend_from_slice(&pgn_bytes[..3]);
    payload.push(dst);
    payload.extend_from_slice(data);
    encode_frame(N2K_MSG_SEND, &payload)
}

#[cfg(test)]
#[path = "ngt1_tests.rs"]
mod tests;
