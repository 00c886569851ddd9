//! Timestamps in the history store's epoch: microseconds since 1601-01-01 UTC.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Seconds between 1601-01-01 and 1970-01-01
const UNIX_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

const MICROS_PER_SEC: i64 = 1_000_000;
const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SEC;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChromeTime(pub i64);

impl ChromeTime {
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    pub fn from_system_time(time: SystemTime) -> Self {
        let since_unix = match time.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_micros() as i64,
            Err(e) => -(e.duration().as_micros() as i64),
        };
        Self(since_unix + UNIX_EPOCH_OFFSET_SECS * MICROS_PER_SEC)
    }

    pub fn to_system_time(self) -> SystemTime {
        let since_unix = self.0 - UNIX_EPOCH_OFFSET_SECS * MICROS_PER_SEC;
        if since_unix >= 0 {
            UNIX_EPOCH + Duration::from_micros(since_unix as u64)
        } else {
            UNIX_EPOCH - Duration::from_micros(since_unix.unsigned_abs())
        }
    }

    pub fn minus_days(self, days: i64) -> Self {
        Self(self.0 - days * MICROS_PER_DAY)
    }

    pub fn as_micros(self) -> i64 {
        self.0
    }
}
