//! Shared identifiers, timestamps, and defaults.

use chrono::{DateTime, DurationRound, SecondsFormat, TimeDelta, Utc};
use uuid::Uuid;

/// Opaque material identifier assigned by the store.
pub type MaterialId = Uuid;
/// UTC timestamp with microsecond precision.
pub type Timestamp = DateTime<Utc>;

/// Unit symbol used when a draft does not name one.
pub const DEFAULT_UNIT: &str = "un";
/// Minimum quantity used when a draft does not name one.
pub const DEFAULT_MINIMUM_QUANTITY: i64 = 1;
/// Blob key under which the document backend keeps the collection.
pub const DEFAULT_DOCUMENT_KEY: &str = "materials_db";

/// Smallest step between two stamps issued by the store.
pub fn stamp_resolution() -> TimeDelta {
    TimeDelta::microseconds(1)
}

/// Truncates `ts` to [`stamp_resolution`] so it survives a text round trip.
pub fn truncate_timestamp(ts: Timestamp) -> Timestamp {
    ts.duration_trunc(stamp_resolution()).unwrap_or(ts)
}

/// Formats a timestamp as fixed-width RFC 3339 (`2024-01-02T03:04:05.000006Z`).
///
/// Fixed width keeps lexical order equal to chronological order.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses any RFC 3339 timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}

/// Serde adapter using [`format_timestamp`] / [`parse_timestamp`].
pub mod timestamp_format {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::{Timestamp, format_timestamp, parse_timestamp};

    /// Serializes a timestamp as fixed-width RFC 3339 text.
    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    /// Deserializes RFC 3339 text into a timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn formatted_stamps_sort_like_the_instants() {
        let a = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let b = a + TimeDelta::microseconds(7);
        let c = a + TimeDelta::seconds(11);

        let mut texts = vec![format_timestamp(&c), format_timestamp(&a), format_timestamp(&b)];
        texts.sort();
        assert_eq!(texts, vec![format_timestamp(&a), format_timestamp(&b), format_timestamp(&c)]);
        assert_eq!(format_timestamp(&b), "2024-05-01T09:00:00.000007Z");
    }

    #[test]
    fn truncated_stamp_survives_text() {
        let ts = truncate_timestamp(Utc::now());
        assert_eq!(parse_timestamp(&format_timestamp(&ts)).unwrap(), ts);
    }
}
