//! Storage queue trigger.

use crate::data::RawValue;
use crate::envelope::{Invocation, Metadata};
use crate::trigger::{fields, SysMetadata, Trigger, TriggerError, TriggerKind};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A storage queue message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueTrigger {
    data: RawValue,
    /// Queue-specific metadata.
    pub metadata: QueueMetadata,
}

/// Metadata the host sends with a queue message.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueueMetadata {
    #[serde(default, deserialize_with = "fields::lenient_u64")]
    pub dequeue_count: Option<u64>,
    /// Message id, with the host's surrounding quotes removed.
    #[serde(default, deserialize_with = "fields::unquoted")]
    pub id: String,
    /// Pop receipt, with the host's surrounding quotes removed.
    #[serde(default, deserialize_with = "fields::unquoted")]
    pub pop_receipt: String,
    #[serde(default, deserialize_with = "fields::flexible_utc")]
    pub expiration_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "fields::flexible_utc")]
    pub insertion_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "fields::flexible_utc")]
    pub next_visible_time: Option<DateTime<Utc>>,
    #[serde(rename = "sys", default)]
    pub sys: SysMetadata,
    /// Any other metadata fields, such as values bound from the message.
    #[serde(flatten)]
    pub extra: Metadata,
}

impl Trigger for QueueTrigger {
    const KIND: TriggerKind = TriggerKind::Queue;

    fn from_invocation(invocation: Invocation) -> Result<Self, TriggerError> {
        let metadata = invocation.metadata_as::<QueueMetadata>()?;
        let (data, _) = invocation.into_parts();
        Ok(Self { data, metadata })
    }

    fn data(&self) -> &RawValue {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: &[u8] = br#"{
        "Data": {
            "queue": "{\"message\":\"hello\",\"number\":2}"
        },
        "Metadata": {
            "DequeueCount": "1",
            "ExpirationTime": "2023-10-12T20:13:49.640002Z",
            "Id": "\"4e773554-f6b7-4ea2-b07d-4c5fd5aba741\"",
            "InsertionTime": "2023-10-12T20:13:49.640002Z",
            "NextVisibleTime": "2023-10-12T20:13:49.640002Z",
            "PopReceipt": "\"STRING\"",
            "sys": {
                "MethodName": "helloQueue",
                "UtcNow": "2023-10-12T20:13:49.640002Z",
                "RandGuid": "4e773554-f6b7-4ea2-b07d-4c5fd5aba741"
            },
            "message": "\"hello\""
        }
    }"#;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Message {
        message: String,
        number: i32,
    }

    #[test]
    fn test_queue_trigger() {
        let trigger = QueueTrigger::decode(REQUEST, "queue").unwrap();
        let metadata = &trigger.metadata;

        assert_eq!(trigger.data().as_bytes(), br#"{"message":"hello","number":2}"#);
        assert_eq!(metadata.dequeue_count, Some(1));
        assert_eq!(metadata.id, "4e773554-f6b7-4ea2-b07d-4c5fd5aba741");
        assert_eq!(metadata.pop_receipt, "STRING");
        assert_eq!(
            metadata.insertion_time.unwrap().to_rfc3339(),
            "2023-10-12T20:13:49.640002+00:00"
        );
        assert_eq!(metadata.sys.method_name, "helloQueue");
        assert_eq!(metadata.extra["message"], "\"hello\"");
    }

    #[test]
    fn test_queue_parse() {
        let trigger = QueueTrigger::decode(REQUEST, "queue").unwrap();
        let message: Message = trigger.parse().unwrap();
        assert_eq!(message, Message { message: "hello".into(), number: 2 });

        let mut target = Message { message: String::new(), number: 0 };
        trigger.parse_into(&mut target).unwrap();
        assert_eq!(target, message);
    }

    #[test]
    fn test_queue_name_mismatch() {
        let err = QueueTrigger::decode(REQUEST, "other").unwrap_err();
        assert!(matches!(err, TriggerError::NameMismatch(_)));
    }

    #[test]
    fn test_queue_malformed_metadata() {
        let body = br#"{"Data":{"queue":"hi"},"Metadata":{"DequeueCount":"many"}}"#;
        let err = QueueTrigger::decode(body, "queue").unwrap_err();
        assert!(matches!(err, TriggerError::PayloadMalformed(_)));
    }
}
