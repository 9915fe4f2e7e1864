//! Time source for entry timestamps and archive names

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Format of the timestamp that starts every log line
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock in local time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl FixedClock {
    /// Clock pinned to a local wall-clock time, e.g. `"2026-10-18 14:03:05"`
    ///
    /// Returns `None` if the string does not parse or the time does not exist locally.
    pub fn at(local: &str) -> Option<Self> {
        let naive = NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S").ok()?;
        Local.from_local_datetime(&naive).earliest().map(FixedClock)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Render a log line timestamp
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Make a line timestamp safe for use in a file name
pub fn sanitize_timestamp(stamp: &str) -> String {
    stamp.replace('/', "-").replace(':', ".").replace(' ', "_")
}
