//! Timing utilities for TUIO
//!
//! Frame messages carry an OSC timetag: seconds since 1900-01-01 plus a
//! 32-bit binary fraction.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rosc::OscTime;

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970)
pub const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

/// The OSC "immediately" timetag
pub const IMMEDIATELY: Timetag = Timetag {
    seconds: 0,
    fraction: 1,
};

/// OSC timetag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timetag {
    pub seconds: u32,
    pub fraction: u32,
}

impl Timetag {
    pub fn new(seconds: u32, fraction: u32) -> Self {
        Self { seconds, fraction }
    }

    /// Current wall-clock time as a timetag
    pub fn now() -> Self {
        let since_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self::from_unix_duration(since_unix)
    }

    /// Convert a duration since the Unix epoch
    pub fn from_unix_duration(d: Duration) -> Self {
        let seconds = (d.as_secs() + NTP_UNIX_OFFSET) as u32;
        let fraction = ((d.subsec_nanos() as u64) << 32) / 1_000_000_000;
        Self {
            seconds,
            fraction: fraction as u32,
        }
    }

    /// Microseconds since the Unix epoch (saturating at zero)
    pub fn to_unix_micros(&self) -> u64 {
        let secs = (self.seconds as u64).saturating_sub(NTP_UNIX_OFFSET);
        let micros = ((self.fraction as u64) * 1_000_000) >> 32;
        secs * 1_000_000 + micros
    }
}

impl From<OscTime> for Timetag {
    fn from(t: OscTime) -> Self {
        Self {
            seconds: t.seconds,
            fraction: t.fractional,
        }
    }
}

impl From<Timetag> for OscTime {
    fn from(t: Timetag) -> Self {
        OscTime {
            seconds: t.seconds,
            fractional: t.fraction,
        }
    }
}

impl fmt::Display for Timetag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:08x}", self.seconds, self.fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_roundtrip() {
        let d = Duration::from_micros(1_700_000_000_250_000);
        let tag = Timetag::from_unix_duration(d);
        let back = tag.to_unix_micros();
        assert!((back as i64 - 1_700_000_000_250_000i64).abs() <= 1);
    }

    #[test]
    fn test_osc_time_conversion() {
        let tag = Timetag::new(3_900_000_000, 0x8000_0000);
        let osc: OscTime = tag.into();
        assert_eq!(osc.seconds, 3_900_000_000);
        assert_eq!(osc.fractional, 0x8000_0000);
        assert_eq!(Timetag::from(osc), tag);
    }

    #[test]
    fn test_now_is_after_unix_epoch() {
        let tag = Timetag::now();
        assert!(tag.seconds as u64 > NTP_UNIX_OFFSET);
    }
}
