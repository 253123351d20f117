//! Lenient field decoders for trigger metadata.
//!
//! The host is loose about metadata types: counters arrive as numbers or
//! numeric strings, identifiers arrive quote-wrapped, and any field may be
//! `null`.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::collections::HashMap;

/// Layout used by the host for timestamps without an offset.
pub(crate) const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Treat `null` as the type's default value.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A string with any surrounding double quotes removed.
pub(crate) fn unquoted<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim_matches('"').to_string())
        .unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

/// A counter sent either as a JSON number or as a numeric string.
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) => {
            let s = s.trim_matches('"').trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse().map(Some).map_err(de::Error::custom)
        }
    }
}

/// An RFC 3339 timestamp; values without an offset are read as UTC.
pub(crate) fn flexible_utc<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
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
    if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(s, NAIVE_FORMAT)
        .map(|naive| Some(Utc.from_utc_datetime(&naive)))
        .map_err(de::Error::custom)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// A header map whose values are either single strings or lists.
pub(crate) fn header_values<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, OneOrMany>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, values)| match values {
            OneOrMany::One(value) => (name, vec![value]),
            OneOrMany::Many(values) => (name, values),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[derive(Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "lenient_u64")]
        count: Option<u64>,
        #[serde(default, deserialize_with = "unquoted")]
        id: String,
        #[serde(default, deserialize_with = "flexible_utc")]
        at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "header_values")]
        headers: HashMap<String, Vec<String>>,
    }

    #[test]
    fn test_lenient_counter() {
        let from_string: Fields = serde_json::from_str(r#"{"count":"3"}"#).unwrap();
        let from_number: Fields = serde_json::from_str(r#"{"count":3}"#).unwrap();
        let from_null: Fields = serde_json::from_str(r#"{"count":null}"#).unwrap();
        assert_eq!(from_string.count, Some(3));
        assert_eq!(from_number.count, Some(3));
        assert_eq!(from_null.count, None);
        assert!(serde_json::from_str::<Fields>(r#"{"count":"three"}"#).is_err());
    }

    #[test]
    fn test_unquoted_identifier() {
        let fields: Fields = serde_json::from_str(r#"{"id":"\"abc-123\""}"#).unwrap();
        assert_eq!(fields.id, "abc-123");
    }

    #[test]
    fn test_flexible_timestamps() {
        let zulu: Fields = serde_json::from_str(r#"{"at":"2023-10-12T20:13:49.640002Z"}"#).unwrap();
        let naive: Fields = serde_json::from_str(r#"{"at":"2023-10-12T20:13:49"}"#).unwrap();
        let empty: Fields = serde_json::from_str(r#"{"at":""}"#).unwrap();
        assert_eq!(zulu.at.unwrap().nanosecond(), 640_002_000);
        assert_eq!(naive.at.unwrap().to_rfc3339(), "2023-10-12T20:13:49+00:00");
        assert!(empty.at.is_none());
    }

    #[test]
    fn test_header_values_single_or_list() {
        let fields: Fields = serde_json::from_str(
            r#"{"headers":{"Content-Type":"application/json","Accept":["a","b"]}}"#,
        )
        .unwrap();
        assert_eq!(fields.headers["Content-Type"], vec!["application/json"]);
        assert_eq!(fields.headers["Accept"], vec!["a", "b"]);
    }
}
