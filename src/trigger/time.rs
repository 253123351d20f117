//! ISO 8601 timestamps that remember whether they carried an offset.

use crate::trigger::fields::NAIVE_FORMAT;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

const OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// A timestamp sent by the host either as `2023-10-12T20:13:49` or as
/// `2023-10-12T20:13:49+00:00`. Re-encoding reproduces the form it was
/// parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsoTimestamp {
    /// No offset present; the wall time is taken as UTC.
    Naive(NaiveDateTime),
    /// An explicit offset was present.
    Offset(DateTime<FixedOffset>),
}

impl IsoTimestamp {
    /// Parse the no-offset form first, then the offset-qualified form.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, NAIVE_FORMAT) {
            return Ok(IsoTimestamp::Naive(naive));
        }
        match DateTime::parse_from_str(s, OFFSET_FORMAT) {
            Ok(parsed) => Ok(IsoTimestamp::Offset(parsed)),
            Err(err) => DateTime::parse_from_rfc3339(s)
                .map(IsoTimestamp::Offset)
                .map_err(|_| err),
        }
    }

    /// Whether the original value carried an offset.
    pub fn has_offset(&self) -> bool {
        matches!(self, IsoTimestamp::Offset(_))
    }

    /// The instant in UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            IsoTimestamp::Naive(naive) => Utc.from_utc_datetime(naive),
            IsoTimestamp::Offset(parsed) => parsed.with_timezone(&Utc),
        }
    }
}

impl fmt::Display for IsoTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsoTimestamp::Naive(naive) => write!(f, "{}", naive.format(NAIVE_FORMAT)),
            IsoTimestamp::Offset(parsed) => write!(f, "{}", parsed.format(OFFSET_FORMAT)),
        }
    }
}

impl Serialize for IsoTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IsoTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        IsoTimestamp::parse(raw.trim_matches('"')).map_err(de::Error::custom)
    }
}

/// Optional variant that treats `null` and empty strings as absent.
pub(crate) fn optional_iso<'de, D>(deserializer: D) -> Result<Option<IsoTimestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let s = raw.trim_matches('"');
    if s.is_empty() {
        return Ok(None);
    }
    IsoTimestamp::parse(s).map(Some).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naive_round_trip() {
        let ts = IsoTimestamp::parse("2023-10-12T20:13:49").unwrap();
        assert!(!ts.has_offset());
        assert_eq!(serde_json::to_string(&ts).unwrap(), r#""2023-10-12T20:13:49""#);
    }

    #[test]
    fn test_offset_round_trip() {
        let ts = IsoTimestamp::parse("2023-10-12T20:13:49+00:00").unwrap();
        assert!(ts.has_offset());
        assert_eq!(serde_json::to_string(&ts).unwrap(), r#""2023-10-12T20:13:49+00:00""#);
    }

    #[test]
    fn test_non_utc_offset_kept() {
        let ts: IsoTimestamp = serde_json::from_str(r#""2023-10-12T22:13:49+02:00""#).unwrap();
        assert_eq!(ts.to_string(), "2023-10-12T22:13:49+02:00");
        assert_eq!(ts.to_utc().to_rfc3339(), "2023-10-12T20:13:49+00:00");
    }

    #[test]
    fn test_fractional_seconds() {
        let ts = IsoTimestamp::parse("2023-10-12T20:13:49.5").unwrap();
        assert_eq!(ts.to_string(), "2023-10-12T20:13:49.500");
    }

    #[test]
    fn test_invalid() {
        assert!(IsoTimestamp::parse("yesterday").is_err());
    }
}
