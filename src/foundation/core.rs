use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::foundation::error::{RaceError, RaceResult};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Totally ordered time-bucket key.
///
/// Every `Instant` orders before every `Label`; labels order lexicographically.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BucketKey {
    /// A parsed calendar date or date-time (naive, UTC for offset inputs).
    Instant(NaiveDateTime),
    /// An opaque period label such as `2021-03` or `week 12`.
    Label(String),
}

impl BucketKey {
    /// Parse date text into a key.
    ///
    /// Recognized dates become [`BucketKey::Instant`]; any other non-blank text is kept as a
    /// [`BucketKey::Label`]. Blank text is rejected.
    pub fn parse(text: &str) -> RaceResult<Self> {
        let t = text.trim();
        if t.is_empty() {
            return Err(RaceError::validation("date must be non-empty"));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
            return Ok(Self::Instant(dt.naive_utc()));
        }
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
                return Ok(Self::Instant(dt));
            }
        }
        if let Ok(d) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
            return Ok(Self::Instant(d.and_time(NaiveTime::MIN)));
        }

        Ok(Self::Label(t.to_owned()))
    }

    /// Truncate an instant to midnight of its day. Labels are returned unchanged.
    pub fn truncate_to_day(&self) -> Self {
        match self {
            Self::Instant(dt) => Self::Instant(dt.date().and_time(NaiveTime::MIN)),
            Self::Label(l) => Self::Label(l.clone()),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instant(dt) if dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 => {
                write!(f, "{}", dt.format("%Y-%m-%d"))
            }
            Self::Instant(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Self::Label(l) => f.write_str(l),
        }
    }
}

/// 0-based position of a frame within one playback run.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Identity of one playback run. Strictly increasing per scheduler.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct RunId(pub u64);

impl RunId {
    /// The identity that follows `self`.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
