//! Time and timestamp helpers.

use chrono::{DateTime, DurationRound, NaiveDateTime, TimeDelta, Utc};

/// UTC timestamp used for readings, audit entries, notifications, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Truncate a timestamp to the top of its hour.
#[must_use]
pub fn truncate_to_hour(ts: Timestamp) -> Timestamp {
    // Rounding by a whole hour on a UTC timestamp cannot overflow.
    ts.duration_trunc(TimeDelta::hours(1)).unwrap_or(ts)
}

/// Parse an RFC 3339 timestamp, or a naive ISO 8601 one which is taken as UTC.
///
/// The backend serialises some datetimes without an offset, and the carbon
/// feed uses `2024-12-01T17:30Z` (no seconds).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .map(|naive| naive.and_utc())
}

/// `#[serde(with = "lenient")]` for timestamps that may lack an offset.
pub mod lenient {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Timestamp, parse_timestamp};

    /// # Errors
    ///
    /// Fails when the string is neither RFC 3339 nor naive ISO 8601.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}")))
    }

    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339())
    }
}
