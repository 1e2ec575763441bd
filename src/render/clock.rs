//! System clock adjustment driven by PGN 126992 (System Time), gated on
//! `-clocksrc` matching the message's source address. The analyzer otherwise
//! never touches the host clock.
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::engine::decode::{DecodedPgn, FieldValue};

/// Reconstruct a `DateTime<Utc>` from a decoded PGN 126992 (System Time)
/// message: `Date` is days since the Unix epoch, `Time` is seconds since
/// local midnight.
pub fn system_time(decoded: &DecodedPgn) -> Option<DateTime<Utc>> {
    let days = decoded.fields.iter().find(|f| f.name == "Date").and_then(|f| match f.value {
        FieldValue::Integer(v) => Some(v),
        _ => None,
    })?;
    let seconds_of_day = decoded.fields.iter().find(|f| f.name == "Time").and_then(|f| match f.value {
        FieldValue::Number(v) => Some(v),
        _ => None,
    })?;
    let date = NaiveDate::from_ymd_opt(1970, 1, 1)? + ChronoDuration::days(days);
    let whole_secs = seconds_of_day.trunc() as u32;
    let nanos = (seconds_of_day.fract() * 1e9).round() as u32;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(whole_secs, nanos)?;
    Some(Utc.from_utc_datetime(&NaiveDateTime::new(date, time)))
}

/// Applies a decoded PGN 126992 timestamp to the host clock.
pub trait ClockAdjuster {
    fn set_time(&self, time: DateTime<Utc>) -> std::io::Result<()>;
}

/// Default: does nothing. Used whenever `-clocksrc` wasn't given.
pub struct NoopAdjuster;

impl ClockAdjuster for NoopAdjuster {
    fn set_time(&self, _time: DateTime<Utc>) -> std::io::Result<()> {
        Ok(())
    }
}

/// Drift beyond which the clock is stepped immediately with
/// `settimeofday(2)` rather than slewed: a jump this large means the host
/// clock was badly wrong (cold boot with no RTC), and smoothing it in would
/// take hours.
const STEP_THRESHOLD_SECS: i64 = 30;

/// On a host where `adjtime(2)` isn't available, drift beyond this much
/// smaller threshold is stepped instead of silently never corrected.
const STEP_THRESHOLD_SECS_NO_ADJTIME: i64 = 1;

/// Adjusts the host clock to a PGN 126992 timestamp, matching the way an
/// Actisense gateway installation keeps a headless Pi's clock disciplined to
/// GPS time coming off the bus: large jumps step the clock outright, small
/// ones are slewed in via `adjtime(2)` so running timers don't observe the
/// clock moving backwards.
pub struct SystemClockAdjuster;

impl SystemClockAdjuster {
    fn drift_secs(&self, target: DateTime<Utc>) -> std::io::Result<i64> {
        let now = nix::time::clock_gettime(nix::time::ClockId::CLOCK_REALTIME)
            .map_err(|e| std::io::Error::from_raw_os_error(e as i32))?;
        Ok(target.timestamp() - now.tv_sec())
    }

    fn step(&self, time: DateTime<Utc>) -> std::io::Result<()> {
        let tv = libc::timeval {
            tv_sec: time.timestamp() as libc::time_t,
            tv_usec: time.timestamp_subsec_micros() as libc::suseconds_t,
        };
        // SAFETY: `tv` is a valid, fully-initialized `timeval`; `tz` is null
        // as the kernel requires for any caller not emulating `date`'s
        // legacy timezone-setting behavior.
        let rc = unsafe { libc::settimeofday(&tv, std::ptr::null()) };
        if rc != 0 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(())
    }

    fn slew(&self, drift_secs: i64) -> std::io::Result<()> {
        let delta = libc::timeval {
            tv_sec: drift_secs as libc::time_t,
            tv_usec: 0,
        };
        // SAFETY: `delta` is valid; the old-delta output pointer is null
        // because the caller has no use for the previously pending slew.
        let rc = unsafe { libc::adjtime(&delta, std::ptr::null_mut()) };
        if rc != 0 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(())
    }
}

impl ClockAdjuster for SystemClockAdjuster {
    fn set_time(&self, time: DateTime<Utc>) -> std::io::Result<()> {
        let drift = self.drift_secs(time)?;
        if drift.abs() > STEP_THRESHOLD_SECS {
            return self.step(time);
        }
        match self.slew(drift) {
            Ok(()) => Ok(()),
            Err(_) if drift.abs() > STEP_THRESHOLD_SECS_NO_ADJTIME => self.step(time),
            Err(_) => Ok(()),
        }
    }
}

/// Should this PGN 126992 message drive the clock? Only when its source
/// address matches the configured `-clocksrc`.
pub fn should_adjust(clocksrc: Option<u8>, src: u8) -> bool {
    clocksrc == Some(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_only_the_configured_source() {
        assert!(should_adjust(Some(35), 35));
        assert!(!should_adjust(Some(35), 36));
        assert!(!should_adjust(None, 35));
    }

    #[test]
    fn noop_adjuster_always_succeeds() {
        assert!(NoopAdjuster.set_time(Utc::now()).is_ok());
    }

    #[test]
    fn system_time_reconstructs_date_and_time_of_day() {
        use crate::engine::decode::DecodedField;
        let decoded = DecodedPgn {
            pgn: 126992,
            description: "System Time",
            fields: vec![
                DecodedField { name: "Date", unit: None, value: FieldValue::Integer(20_000) },
                DecodedField { name: "Time", unit: None, value: FieldValue::Number(3_723.5) },
            ],
            repeating1: vec![],
            repeating2: vec![],
            complete: true,
        };
        let time = system_time(&decoded).unwrap();
        assert_eq!(time.format("%H:%M:%S").to_string(), "01:02:03");
    }
}
