//! Build date, read once at the CLI edge and passed in.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};

/// The instant a build happens, in UTC.
///
/// Decides the palette path (month) and the date-derived default seed, and
/// stamps the font header and exports. Nothing below the CLI reads the wall
/// clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildClock {
    timestamp: i64,
}

impl BuildClock {
    pub fn now() -> Self {
        Self::from_timestamp(Utc::now().timestamp())
    }

    /// Unix seconds, UTC.
    pub fn from_timestamp(timestamp: i64) -> Self {
        Self { timestamp }
    }

    /// Midnight UTC of a calendar date.
    pub fn at_date(year: i32, month: u32, day: u32) -> Option<Self> {
        let midnight = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
        Some(Self::from_timestamp(midnight.and_utc().timestamp()))
    }

    fn datetime(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.timestamp, 0).unwrap_or_default()
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Month, 1-12.
    pub fn month(&self) -> u32 {
        self.datetime().month()
    }

    /// `YYYYMMDD` as an integer, used when the seed is left at 0.
    pub fn date_seed(&self) -> u32 {
        let dt = self.datetime();
        dt.year().max(0) as u32 * 10_000 + dt.month() * 100 + dt.day()
    }

    pub fn rfc3339(&self) -> String {
        self.datetime().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
