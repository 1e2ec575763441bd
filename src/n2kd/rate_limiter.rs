//! Per-(source, sentence kind) rate limiting for NMEA 0183 derivation: caps
//! how often the same derived sentence type from the same device is
//! forwarded to clients, independent of how often the underlying PGN
//! actually arrives on the bus. Decoded-JSON output is never rate limited.
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Key {
    src: u8,
    sentence_kind: &'static str,
}

/// Minimum interval enforced between forwarded sentences of the same
/// (src, sentence kind), regardless of arrival rate.
pub struct RateLimiter {
    min_interval: Duration,
    last_sent: HashMap<Key, Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_sent: HashMap::new(),
        }
    }

    /// `true` if a sentence of `sentence_kind` for `src` may be forwarded
    /// right now; records the send if so.
    pub fn allow(&mut self, src: u8, sentence_kind: &'static str, now: Instant) -> bool {
        let key = Key { src, sentence_kind };
        match self.last_sent.get(&key) {
            Some(&last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last_sent.insert(key, now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppresses_rapid_repeats_of_the_same_source_and_kind() {
        let mut limiter = RateLimiter::new(Duration::from_secs(1));
        let t0 = Instant::now();
        assert!(limiter.allow(1, "GLL", t0));
        assert!(!limiter.allow(1, "GLL", t0 + Duration::from_millis(500)));
        assert!(limiter.allow(1, "GLL", t0 + Duration::from_millis(1100)));
    }

    #[test]
    fn distinct_sources_are_limited_independently() {
        let mut limiter = RateLimiter::new(Duration::from_secs(1));
        let t0 = Instant::now();
        assert!(limiter.allow(1, "GLL", t0));
        assert!(limiter.allow(2, "GLL", t0));
    }

    #[test]
    fn distinct_sentence_kinds_from_the_same_source_are_limited_independently() {
        let mut limiter = RateLimiter::new(Duration::from_secs(1));
        let t0 = Instant::now();
        assert!(limiter.allow(1, "GLL", t0));
        assert!(limiter.allow(1, "HDG", t0));
    }
}
