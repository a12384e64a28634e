use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// An instant in time, carried on the wire as an RFC 3339 string.
///
/// Date-shaped strings in a transport payload decode to a `Timestamp` rather
/// than a plain string; see the codec's special-form recognition.
///
/// The wire form carries millisecond precision, so every constructor
/// truncates to milliseconds; a `Timestamp` always round-trips exactly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

fn truncate_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(dt.timestamp_millis())
        .single()
        .unwrap_or(dt)
}

impl Timestamp {
    /// The current wall-clock time.
    pub fn now() -> Self {
        Self(truncate_to_millis(Utc::now()))
    }

    /// From milliseconds since the UNIX epoch.
    pub fn from_millis(ms: i64) -> Result<Self, TypeError> {
        Utc.timestamp_millis_opt(ms)
            .single()
            .map(Self)
            .ok_or_else(|| TypeError::InvalidTimestamp(format!("{ms}ms")))
    }

    /// Parse an RFC 3339 string, e.g. `2026-08-29T12:00:00Z`.
    pub fn parse_rfc3339(s: &str) -> Result<Self, TypeError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(truncate_to_millis(dt.with_timezone(&Utc))))
            .map_err(|e| TypeError::InvalidTimestamp(format!("{s}: {e}")))
    }

    /// Render as an RFC 3339 string with millisecond precision.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Milliseconds since the UNIX epoch.
    pub fn millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.to_rfc3339())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_millis(dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_roundtrip() {
        let ts = Timestamp::from_millis(1_700_000_000_123).unwrap();
        let s = ts.to_rfc3339();
        let parsed = Timestamp::parse_rfc3339(&s).unwrap();
        assert_eq!(ts, parsed);
    }

    #[test]
    fn parse_accepts_offset_forms() {
        let a = Timestamp::parse_rfc3339("2026-08-29T12:00:00Z").unwrap();
        let b = Timestamp::parse_rfc3339("2026-08-29T14:00:00+02:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parse_rejects_non_dates() {
        assert!(Timestamp::parse_rfc3339("hello").is_err());
        assert!(Timestamp::parse_rfc3339("2026-13-01T00:00:00Z").is_err());
    }

    #[test]
    fn millis_roundtrip() {
        let ts = Timestamp::from_millis(42).unwrap();
        assert_eq!(ts.millis(), 42);
    }

    #[test]
    fn now_is_recent() {
        // After 2020-01-01.
        assert!(Timestamp::now().millis() > 1_577_836_800_000);
    }

    #[test]
    fn now_roundtrips_exactly() {
        let ts = Timestamp::now();
        let parsed = Timestamp::parse_rfc3339(&ts.to_rfc3339()).unwrap();
        assert_eq!(ts, parsed);
    }

    #[test]
    fn construction_truncates_below_milliseconds() {
        let precise = Utc
            .timestamp_opt(1_700_000_000, 123_456_789)
            .single()
            .unwrap();
        let ts = Timestamp::from(precise);
        assert_eq!(ts.millis(), 1_700_000_000_123);
        assert_eq!(ts, Timestamp::from_millis(1_700_000_000_123).unwrap());
    }
}
