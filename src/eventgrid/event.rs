use crate::eventgrid::{EventError, EventProvider, Schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

const DATA_VERSION: &str = "1.0";

/// An event in the Event Grid schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub data: Value,
    pub topic: String,
    pub subject: String,
    pub event_type: String,
    pub event_time: DateTime<Utc>,
    pub id: String,
    pub data_version: String,
}

impl Event {
    /// Create an event with a fresh id and the current time. `data` must not
    /// serialize to `null`.
    pub fn new(
        subject: impl Into<String>,
        event_type: impl Into<String>,
        data: impl Serialize,
    ) -> Result<Self, EventError> {
        let subject = subject.into();
        let event_type = event_type.into();
        if subject.is_empty() {
            return Err(EventError::MissingField("subject"));
        }
        if event_type.is_empty() {
            return Err(EventError::MissingField("eventType"));
        }
        let data = serde_json::to_value(data)?;
        if data.is_null() {
            return Err(EventError::MissingField("data"));
        }

        Ok(Self {
            data,
            topic: String::new(),
            subject,
            event_type,
            event_time: Utc::now(),
            id: Uuid::new_v4().to_string(),
            data_version: DATA_VERSION.to_string(),
        })
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.event_time = time;
        self
    }
}

impl EventProvider for Event {
    fn schema(&self) -> Schema {
        Schema::EventGrid
    }

    fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
