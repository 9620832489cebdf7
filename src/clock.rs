//! Injected time source
//!
//! Message ids and display timestamps both come from a [`Clock`], so tests can
//! drive time explicitly with [`ManualClock`] instead of reading the system
//! clock.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Utc};
use std::sync::Mutex;

/// Display format for message and request timestamps (`2025-01-31 14:05:09`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of the current local wall-clock time
pub trait Clock: Send + Sync {
    /// Current local date-time
    fn now(&self) -> NaiveDateTime;

    /// Current time formatted with [`TIMESTAMP_FORMAT`]
    fn timestamp(&self) -> String {
        format_timestamp(self.now())
    }

    /// Current time as milliseconds since the Unix epoch
    ///
    /// The default reads [`Clock::now`] as if it were UTC, which is exact for
    /// frozen test clocks.
    fn now_millis(&self) -> u64 {
        u64::try_from(self.now().and_utc().timestamp_millis()).unwrap_or_default()
    }
}

/// Format a date-time with [`TIMESTAMP_FORMAT`]
///
/// # Examples
///
/// ```
/// use chatgenie::clock::format_timestamp;
/// use chrono::NaiveDate;
///
/// let dt = NaiveDate::from_ymd_opt(2025, 1, 31)
///     .unwrap()
///     .and_hms_opt(14, 5, 9)
///     .unwrap();
/// assert_eq!(format_timestamp(dt), "2025-01-31 14:05:09");
/// ```
pub fn format_timestamp(dt: NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Clock backed by the operating system's local time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn now_millis(&self) -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
    }
}

/// Manually advanced clock for deterministic tests
///
/// Time only moves when [`ManualClock::advance`] is called.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Create a clock frozen at `2025-01-01 12:00:00`
    pub fn at_default() -> Self {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap_or_default();
        Self::new(start)
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.lock().map(|now| *now).unwrap_or_default()
    }
}
