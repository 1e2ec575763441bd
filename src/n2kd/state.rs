//! Keyed state map of the most recently seen value for each (PGN, source,
//! secondary key) triple, with per-message-class expiry so stale sensor
//! readings eventually drop out of `n2kd -si`'s snapshot output.
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::core::RawMessage;

/// Secondary key beyond (pgn, src): distinguishes rows within a repeating
/// group (e.g. one entry per AIS target, one per instance number).
pub type SecondaryKey = Option<u32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub pgn: u32,
    pub src: u8,
    pub secondary: Option<u32>,
}

/// How long a state entry remains valid before it's pruned as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Ordinary sensor PGNs: engine, depth, wind, and similar.
    Sensor,
    /// AIS target reports, which update far less often.
    Ais,
    /// Address claims: a node's identity rarely needs expiring at all.
    AddressClaim,
}

impl Timeout {
    pub fn duration(self) -> Duration {
        match self {
            Timeout::Sensor => Duration::from_secs(60),
            Timeout::Ais => Duration::from_secs(3600),
            Timeout::AddressClaim => Duration::from_secs(24 * 3600),
        }
    }

    /// Classify a PGN into its timeout class. Unrecognised PGNs default to
    /// the conservative sensor timeout.
    pub fn for_pgn(pgn: u32) -> Timeout {
        match pgn {
            129038 | 129039 | 129040 | 129041 => Timeout::Ais,
            60928 | 126996 => Timeout::AddressClaim,
            _ => Timeout::Sensor,
        }
    }
}

struct Entry {
    message: RawMessage,
    expires_at: Instant,
}

/// Tracks the latest message for every (pgn, src, secondary) key seen,
/// pruning entries once their class-appropriate timeout elapses.
#[derive(Default)]
pub struct StateMap {
    entries: HashMap<StateKey, Entry>,
}

impl StateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: StateKey, message: RawMessage, now: Instant) {
        let timeout = Timeout::for_pgn(key.pgn);
        self.entries.insert(
            key,
            Entry {
                message,
                expires_at: now + timeout.duration(),
            },
        );
    }

    pub fn prune(&mut self, now: Instant) {
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    pub fn get(&self, key: &StateKey) -> Option<&RawMessage> {
        self.entries.get(key).map(|e| &e.message)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> impl Iterator<Item = (&StateKey, &RawMessage)> {
        self.entries.iter().map(|(k, e)| (k, &e.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(pgn: u32) -> RawMessage {
        RawMessage {
            timestamp: "t".into(),
            priority: 2,
            pgn,
            src: 1,
            dst: 255,
            data: vec![],
        }
    }

    #[test]
    fn inserts_and_retrieves_latest() {
        let mut map = StateMap::new();
        let key = StateKey { pgn: 127251, src: 1, secondary: None };
        map.insert(key, msg(127251), Instant::now());
        assert!(map.get(&key).is_some());
    }

    #[test]
    fn sensor_entries_expire_after_their_timeout() {
        let mut map = StateMap::new();
        let key = StateKey { pgn: 127251, src: 1, secondary: None };
        let t0 = Instant::now();
        map.insert(key, msg(127251), t0);
        map.prune(t0 + Duration::from_secs(61));
        assert!(map.get(&key).is_none());
    }

    #[test]
    fn ais_entries_outlive_the_sensor_timeout() {
        let mut map = StateMap::new();
        let key = StateKey { pgn: 129038, src: 1, secondary: None };
        let t0 = Instant::now();
        map.insert(key, msg(129038), t0);
        map.prune(t0 + Duration::from_secs(61));
        assert!(map.get(&key).is_some());
    }

    #[test]
    fn distinct_secondary_keys_are_independent_entries() {
        let mut map = StateMap::new();
        let k1 = StateKey { pgn: 129038, src: 1, secondary: Some(111) };
        let k2 = StateKey { pgn: 129038, src: 1, secondary: Some(222) };
        map.insert(k1, msg(129038), Instant::now());
        map.insert(k2, msg(129038), Instant::now());
        assert_eq!(map.len(), 2);
    }
}
