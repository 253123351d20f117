use crate::eventgrid::{EventError, EventProvider, Schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

const SPEC_VERSION: &str = "1.0";

/// An event in the CloudEvents 1.0 schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub specversion: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub source: String,
    pub id: String,
    pub time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "dataschema", skip_serializing_if = "Option::is_none")]
    pub data_schema: Option<String>,
}

impl CloudEvent {
    /// Create an event with a fresh id and the current time.
    pub fn new(
        source: impl Into<String>,
        event_type: impl Into<String>,
        data: impl Serialize,
    ) -> Result<Self, EventError> {
        let source = source.into();
        let event_type = event_type.into();
        if source.is_empty() {
            return Err(EventError::MissingField("source"));
        }
        if event_type.is_empty() {
            return Err(EventError::MissingField("type"));
        }

        let data = match serde_json::to_value(data)? {
            Value::Null => None,
            data => Some(data),
        };

        Ok(Self {
            data,
            specversion: SPEC_VERSION.to_string(),
            event_type,
            source,
            id: Uuid::new_v4().to_string(),
            time: Utc::now(),
            subject: None,
            data_schema: None,
        })
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_data_schema(mut self, data_schema: impl Into<String>) -> Self {
        self.data_schema = Some(data_schema.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }
}

impl EventProvider for CloudEvent {
    fn schema(&self) -> Schema {
        Schema::CloudEvents
    }

    fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_new_cloud_event() {
        let event = CloudEvent::new("topic", "created", json!({"name": "test"})).unwrap();
        assert_eq!(event.specversion, "1.0");
        assert!(Uuid::parse_str(&event.id).is_ok());
        assert_eq!(event.schema(), Schema::CloudEvents);
    }

    #[test]
    fn test_cloud_event_json() {
        let time = Utc.with_ymd_and_hms(2023, 10, 12, 20, 13, 49).unwrap();
        let event = CloudEvent::new("topic", "created", json!({"name": "test"}))
            .unwrap()
            .with_id("1")
            .with_time(time)
            .with_subject("subject");

        let encoded: Value = serde_json::from_slice(&event.to_json().unwrap()).unwrap();
        assert_eq!(
            encoded,
            json!({
                "data": {"name": "test"},
                "specversion": "1.0",
                "type": "created",
                "source": "topic",
                "id": "1",
                "time": "2023-10-12T20:13:49Z",
                "subject": "subject"
            })
        );
    }

    #[test]
    fn test_cloud_event_without_data() {
        let event = CloudEvent::new("topic", "deleted", ()).unwrap();
        assert!(event.data.is_none());
    }

    #[test]
    fn test_cloud_event_required_fields() {
        assert!(matches!(
            CloudEvent::new("", "created", ()),
            Err(EventError::MissingField("source"))
        ));
        assert!(matches!(
            CloudEvent::new("topic", "", ()),
            Err(EventError::MissingField("type"))
        ));
    }
}
