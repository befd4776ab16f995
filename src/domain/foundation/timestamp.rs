//! Timestamp value object for session activity tracking.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Time elapsed from `earlier` to this timestamp.
    ///
    /// Clamps to zero when `earlier` is actually later (clock skew between
    /// concurrent handlers must never look like idleness).
    pub fn elapsed_since(&self, earlier: &Timestamp) -> Duration {
        self.0
            .signed_duration_since(earlier.0)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Creates a new timestamp by adding a std duration.
    pub fn plus(&self, duration: Duration) -> Self {
        Self(self.0 + to_chrono(duration))
    }

    /// Creates a new timestamp by subtracting a std duration.
    pub fn minus(&self, duration: Duration) -> Self {
        Self(self.0 - to_chrono(duration))
    }

    /// Returns the timestamp as Unix seconds.
    pub fn as_unix_secs(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

fn to_chrono(duration: Duration) -> ChronoDuration {
    ChronoDuration::from_std(duration).unwrap_or_else(|_| ChronoDuration::days(365 * 100))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn elapsed_since_measures_forward_gap() {
        let start = Timestamp::now();
        let later = start.plus(Duration::from_secs(301));
        assert_eq!(later.elapsed_since(&start), Duration::from_secs(301));
    }

    #[test]
    fn elapsed_since_clamps_negative_gap_to_zero() {
        let start = Timestamp::now();
        let earlier = start.minus(Duration::from_secs(10));
        assert_eq!(earlier.elapsed_since(&start), Duration::ZERO);
    }

    #[test]
    fn minus_then_plus_is_identity() {
        let ts = Timestamp::now();
        let shifted = ts.minus(Duration::from_secs(42)).plus(Duration::from_secs(42));
        assert_eq!(ts, shifted);
    }

    #[test]
    fn timestamp_ordering_follows_time() {
        let ts1 = Timestamp::now();
        let ts2 = ts1.plus(Duration::from_millis(10));

        assert!(ts1 < ts2);
        assert!(ts1.is_before(&ts2));
    }

    #[test]
    fn timestamp_serializes_to_rfc3339() {
        let dt = DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let ts = Timestamp::from_datetime(dt);

        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15"));
        assert_eq!(ts.as_unix_secs(), 1705314600);
    }
}
