//! Digital Yacht iKonvert framing: CR/LF terminated ASCII lines. `$PDGY,…`
//! carries status/text, `!PDGY,…` carries a binary PGN in Base64. Also
//! drives the scripted initialization dialog and the device's relative
//! (boot-since) timestamp, which rolls around and must be rebased onto an
//! absolute clock.
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::FrameError;

/// Consecutive status-only lines after which the device is assumed to have
/// reset and the initialization dialog must run again.
pub const STATUS_ONLY_RESET_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMessage {
    pub pgn: u32,
    pub priority: u8,
    pub src: u8,
    pub dst: u8,
    /// Absolute timestamp in milliseconds, rebased from the device's
    /// relative boot-time clock.
    pub timestamp_ms: u64,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Binary(BinaryMessage),
    Status(String),
}

/// Tracks the device's relative clock and rebases it onto a running
/// absolute millisecond counter, rolling forward whenever the relative
/// timestamp decreases (device reboot or counter wrap).
#[derive(Debug, Default)]
struct TimestampRebaser {
    absolute_ms: u64,
    last_relative_ms: Option<u64>,
}

impl TimestampRebaser {
    fn advance(&mut self, relative_ms: u64) -> u64 {
        let delta = match self.last_relative_ms {
            Some(last) if relative_ms >= last => relative_ms - last,
            // Roll-around: the device's clock wrapped or reset; treat the
            // new reading as a fresh delta from zero rather than negative.
            _ => relative_ms,
        };
        self.absolute_ms += delta;
        self.last_relative_ms = Some(relative_ms);
        self.absolute_ms
    }
}

#[derive(Default)]
pub struct Decoder {
    rebaser: TimestampRebaser,
    pub status_only_streak: u32,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one line (without the trailing CR/LF).
    pub fn parse_line(&mut self, line: &str) -> Result<Option<Event>, FrameError> {
        if let Some(rest) = line.strip_prefix("!PDGY,") {
            self.status_only_streak = 0;
            return self.parse_binary(rest).map(Some);
        }
        if let Some(rest) = line.strip_prefix("$PDGY,") {
            self.status_only_streak += 1;
            return Ok(Some(Event::Status(rest.to_string())));
        }
        Err(FrameError::MalformedLine(line.to_string()))
    }

    /// `true` once `STATUS_ONLY_RESET_THRESHOLD` consecutive status-only
    /// lines have arrived with no binary PGN between them: the device has
    /// likely reset and needs to be walked through the init dialog again.
    pub fn needs_reinit(&self) -> bool {
        self.status_only_streak >= STATUS_ONLY_RESET_THRESHOLD
    }

    /// Clears the status-only streak, e.g. after the caller has re-run init.
    pub fn reset_streak(&mut self) {
        self.status_only_streak = 0;
    }

    fn parse_binary(&mut self, rest: &str) -> Result<Event, FrameError> {
        let fields: Vec<&str> = rest.splitn(6, ',').collect();
        let [pgn, prio, src, dst, ts, payload] = fields.as_slice() else {
            return Err(FrameError::MalformedLine(rest.to_string()));
        };
        let pgn: u32 = pgn
            .parse()
            .map_err(|_| FrameError::MalformedLine(rest.to_string()))?;
        let priority: u8 = prio
            .parse()
            .map_err(|_| FrameError::MalformedLine(rest.to_string()))?;
        let src: u8 = src
            .parse()
            .map_err(|_| FrameError::MalformedLine(rest.to_string()))?;
        let dst: u8 = dst
            .parse()
            .map_err(|_| FrameError::MalformedLine(rest.to_string()))?;
        let relative_ms = parse_seconds_millis(ts)
            .ok_or_else(|| FrameError::MalformedLine(rest.to_string()))?;
        let data = BASE64.decode(payload.trim())?;

        let timestamp_ms = self.rebaser.advance(relative_ms);
        Ok(Event::Binary(BinaryMessage {
            pgn,
            priority,
            src,
            dst,
            timestamp_ms,
            data,
        }))
    }
}

fn parse_seconds_millis(s: &str) -> Option<u64> {
    let (secs, millis) = s.split_once('.')?;
    let secs: u64 = secs.parse().ok()?;
    let millis: u64 = millis.parse().ok()?;
    Some(secs * 1000 + millis)
}

/// Build an outbound binary PGN line for transmission.
pub fn encode_binary(pgn: u32, priority: u8, dst: u8, data: &[u8]) -> String {
    format!(
        "!PDGY,{pgn},{priority},{dst},{}\r\n",
        BASE64.encode(data)
    )
}

/// Commands sent during the scripted initialization dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    Offline,
    Reset,
    RxList,
    TxList,
    ShowLists,
    Online,
    RateLimitOff,
}

/// Drives the scripted init dialog: OFFLINE, optional RESET, optional
/// RX_LIST/TX_LIST, optional SHOW_LISTS, ONLINE, optional rate-limit-off.
pub struct InitDialog {
    steps: Vec<InitStep>,
    cursor: usize,
}

impl InitDialog {
    pub fn new(has_allow_list: bool, verbose: bool, rate_limit_off: bool) -> Self {
        let mut steps = vec![InitStep::Offline];
        if has_allow_list {
            steps.push(InitStep::Reset);
            steps.push(InitStep::RxList);
            steps.push(InitStep::TxList);
        }
        if verbose {
            steps.push(InitStep::ShowLists);
        }
        steps.push(InitStep::Online);
        if rate_limit_off {
            steps.push(InitStep::RateLimitOff);
        }
        Self { steps, cursor: 0 }
    }

    pub fn next_command(&self, has_allow_list: bool) -> Option<String> {
        self.steps.get(self.cursor).map(|step| match step {
            InitStep::Offline => "OFFLINE\r\n".to_string(),
            InitStep::Reset => "RESET\r\n".to_string(),
            InitStep::RxList => "RX_LIST\r\n".to_string(),
            InitStep::TxList => "TX_LIST\r\n".to_string(),
            InitStep::ShowLists => "SHOW_LISTS\r\n".to_string(),
            InitStep::Online => {
                if has_allow_list {
                    "ONLINE,NORMAL\r\n".to_string()
                } else {
                    "ONLINE,ALL\r\n".to_string()
                }
            }
            InitStep::RateLimitOff => "RATE_LIMIT,OFF\r\n".to_string(),
        })
    }

    /// Advance past the step just acknowledged. Returns `true` once the
    /// dialog is complete (device is online).
    pub fn acknowledge(&mut self) -> bool {
        self.cursor += 1;
        self.cursor >= self.steps.len()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.steps.len()
    }
}

#[cfg(test)]
#[path = "ikonvert_tests.rs"]
mod tests;
