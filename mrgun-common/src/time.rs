//! Wall-clock helpers. All wire timestamps are ISO-8601 UTC with millisecond
//! precision (§6); [`Timestamp`] enforces that shape on (de)serialization.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// The idempotency window for the business-key lookup (§4.4, §5).
pub const IDEMPOTENCY_WINDOW_SECS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// True if `self` lies within `window_secs` seconds before `now`
    /// (inclusive), per the §5 idempotency-window definition. A candidate
    /// "from the future" relative to `now` is never within the window --
    /// the per-operator row lock is what rules that out in practice.
    pub fn within_window_of(&self, now: Timestamp, window_secs: i64) -> bool {
        let age = now.0 - self.0;
        age >= chrono::Duration::zero() && age <= chrono::Duration::seconds(window_secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Timestamp(dt.with_timezone(&Utc)))
            .map_err(|_| de::Error::custom(format!("'{raw}' is not a valid ISO-8601 timestamp")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_window_boundaries() {
        let now = Timestamp::now();
        let t29 = Timestamp(now.0 - chrono::Duration::seconds(29));
        let t30 = Timestamp(now.0 - chrono::Duration::seconds(30));
        let t31 = Timestamp(now.0 - chrono::Duration::seconds(31));

        assert!(t29.within_window_of(now, IDEMPOTENCY_WINDOW_SECS));
        assert!(t30.within_window_of(now, IDEMPOTENCY_WINDOW_SECS));
        assert!(!t31.within_window_of(now, IDEMPOTENCY_WINDOW_SECS));
    }

    #[test]
    fn future_candidate_is_never_in_window() {
        let now = Timestamp::now();
        let future = Timestamp(now.0 + chrono::Duration::seconds(5));
        assert!(!future.within_window_of(now, IDEMPOTENCY_WINDOW_SECS));
    }
}
