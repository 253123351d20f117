//! Event Grid trigger, accepting both CloudEvents and Event Grid schema
//! events. For both schemas `topic` holds the source of the event.

use crate::data::RawValue;
use crate::envelope::{Invocation, Metadata};
use crate::eventgrid::Schema;
use crate::trigger::{fields, SysMetadata, Trigger, TriggerError, TriggerKind};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// An event delivered by Event Grid.
#[derive(Debug, Clone, PartialEq)]
pub struct EventGridTrigger {
    pub id: String,
    pub topic: String,
    pub subject: String,
    pub event_type: String,
    pub time: Option<DateTime<Utc>>,
    pub schema: Schema,
    pub metadata: EventGridMetadata,
    data: RawValue,
}

/// Invocation metadata of an Event Grid trigger.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventGridMetadata {
    #[serde(default)]
    pub sys: SysMetadata,
    #[serde(flatten)]
    pub extra: Metadata,
}

// Union of the CloudEvents and Event Grid schema fields.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent {
    #[serde(default, deserialize_with = "fields::null_default")]
    id: String,
    #[serde(default, deserialize_with = "fields::null_default")]
    topic: String,
    #[serde(default, deserialize_with = "fields::null_default")]
    source: String,
    #[serde(default, deserialize_with = "fields::null_default")]
    subject: String,
    #[serde(rename = "type", default, deserialize_with = "fields::null_default")]
    kind: String,
    #[serde(default, deserialize_with = "fields::null_default")]
    event_type: String,
    #[serde(default, deserialize_with = "fields::flexible_utc")]
    time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "fields::flexible_utc")]
    event_time: Option<DateTime<Utc>>,
    #[serde(rename = "specversion", default, deserialize_with = "fields::null_default")]
    spec_version: String,
    #[serde(default)]
    data: RawValue,
}

impl Trigger for EventGridTrigger {
    const KIND: TriggerKind = TriggerKind::EventGrid;

    fn from_invocation(invocation: Invocation) -> Result<Self, TriggerError> {
        let event = invocation.payload_as::<WireEvent>()?;
        let metadata = invocation.metadata_as::<EventGridMetadata>()?;

        let (schema, topic, event_type, time) = if !event.spec_version.is_empty() {
            (Schema::CloudEvents, event.source, event.kind, event.time)
        } else if !event.event_type.is_empty() {
            (Schema::EventGrid, event.topic, event.event_type, event.event_time)
        } else {
            return Err(TriggerError::PayloadMalformed(
                "event matches neither the CloudEvents nor the Event Grid schema".to_string(),
            ));
        };

        Ok(Self {
            id: event.id,
            topic,
            subject: event.subject,
            event_type,
            time,
            schema,
            metadata,
            data: event.data,
        })
    }

    fn data(&self) -> &RawValue {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOUD_EVENT: &[u8] = br#"{
        "Data": {
            "event": {
                "id": "4e773554-f6b7-4ea2-b07d-4c5fd5aba741",
                "source": "topic",
                "specversion": "1.0",
                "type": "created",
                "subject": "subject",
                "time": "2023-10-12T20:13:49.640002Z",
                "data": {
                    "id": "4e773554-f6b7-4ea2-b07d-4c5fd5aba741",
                    "name": "test"
                }
            }
        },
        "Metadata": {
            "data": {"id":"4e773554-f6b7-4ea2-b07d-4c5fd5aba741","name":"test"},
            "sys": {
                "MethodName": "testevent",
                "UtcNow": "2023-10-12T20:13:49.640002Z",
                "RandGuid": "4e773554-f6b7-4ea2-b07d-4c5fd5aba741"
            }
        }
    }"#;

    const EVENT_GRID_EVENT: &[u8] = br#"{
        "Data": {
            "event": {
                "id": "4e773554-f6b7-4ea2-b07d-4c5fd5aba741",
                "topic": "topic",
                "subject": "subject",
                "eventType": "created",
                "dataVersion": "1",
                "metadataVersion": "1",
                "eventTime": "2023-10-12T20:13:49.640002Z",
                "data": {"id":"4e773554-f6b7-4ea2-b07d-4c5fd5aba741","name":"test"}
            }
        },
        "Metadata": {
            "sys": {"MethodName": "testevent"}
        }
    }"#;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Created {
        id: String,
        name: String,
    }

    #[test]
    fn test_cloud_event() {
        let trigger = EventGridTrigger::decode(CLOUD_EVENT, "event").unwrap();

        assert_eq!(trigger.schema, Schema::CloudEvents);
        assert_eq!(trigger.id, "4e773554-f6b7-4ea2-b07d-4c5fd5aba741");
        assert_eq!(trigger.topic, "topic");
        assert_eq!(trigger.subject, "subject");
        assert_eq!(trigger.event_type, "created");
        assert!(trigger.time.is_some());
        let created: Created = trigger.parse().unwrap();
        assert_eq!(
            created,
            Created {
                id: "4e773554-f6b7-4ea2-b07d-4c5fd5aba741".into(),
                name: "test".into(),
            }
        );
        assert_eq!(trigger.metadata.sys.method_name, "testevent");
        assert!(trigger.metadata.extra.contains_key("data"));
    }

    #[test]
    fn test_event_grid_event() {
        let trigger = EventGridTrigger::decode(EVENT_GRID_EVENT, "event").unwrap();

        assert_eq!(trigger.schema, Schema::EventGrid);
        assert_eq!(trigger.topic, "topic");
        assert_eq!(trigger.event_type, "created");

        let created: Created = trigger.parse().unwrap();
        assert_eq!(created.name, "test");
    }

    #[test]
    fn test_event_data_keeps_bytes() {
        let body = br#"{"Data":{"event":{"id":"1","specversion":"1.0","source":"s","type":"t",
            "data":{"zeta":1,"alpha":12345678901234567890123}}},"Metadata":{}}"#;
        let trigger = EventGridTrigger::decode(body, "event").unwrap();
        assert_eq!(
            trigger.data().as_bytes(),
            br#"{"zeta":1,"alpha":12345678901234567890123}"#
        );
    }

    #[test]
    fn test_unknown_schema_is_malformed() {
        let body = br#"{"Data":{"event":{"id":"1","subject":"s"}},"Metadata":{}}"#;
        let err = EventGridTrigger::decode(body, "event").unwrap_err();
        assert!(matches!(err, TriggerError::PayloadMalformed(_)));
    }
}
