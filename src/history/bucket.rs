//! Hour-bucket keys for ranking history.
//!
//! A bucket key identifies one hourly ranking snapshot as a local-time
//! `YYYYMMDDHH` string. The string form is also the on-disk map key, so it
//! stays a string end to end and is only parsed for hour arithmetic.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};

/// Format of a bucket key: calendar date plus hour, local time.
const BUCKET_FORMAT: &str = "%Y%m%d%H";

/// An hour-granularity timestamp key (`YYYYMMDDHH`, local time).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey(String);

impl BucketKey {
    /// Wraps an existing key string without validating it.
    ///
    /// Keys that don't parse simply never match any past bucket, so deltas
    /// against them degrade to zero rather than erroring.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The bucket containing the given local time.
    pub fn from_local(t: DateTime<Local>) -> Self {
        Self(t.format(BUCKET_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bucket `hours` hours before this one, or `None` if this key
    /// doesn't parse as `YYYYMMDDHH`.
    pub fn minus_hours(&self, hours: i64) -> Option<BucketKey> {
        let t = self.to_naive()? - Duration::hours(hours);
        Some(Self(t.format(BUCKET_FORMAT).to_string()))
    }

    fn to_naive(&self) -> Option<NaiveDateTime> {
        let s = &self.0;
        if s.len() != 10 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let date = NaiveDate::parse_from_str(&s[..8], "%Y%m%d").ok()?;
        let hour: u32 = s[8..10].parse().ok()?;
        date.and_hms_opt(hour, 0, 0)
    }
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
