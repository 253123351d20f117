//! Outbound Event Grid events.
//!
//! Both the CloudEvents 1.0 schema and the Event Grid schema are supported.
//! Either kind can be written to a generic output binding through
//! [`GenericOutput::write_event`](crate::output::GenericOutput::write_event).

mod cloud_event;
mod event;

pub use cloud_event::CloudEvent;
pub use event::Event;

use std::fmt;
use thiserror::Error;

/// Schema of an Event Grid event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    CloudEvents,
    EventGrid,
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::CloudEvents => f.write_str("CloudEvents"),
            Schema::EventGrid => f.write_str("EventGrid"),
        }
    }
}

/// Failure to build an event.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("event data could not be serialized: {0}")]
    Data(#[from] serde_json::Error),
}

/// An event that can be written to an output binding.
pub trait EventProvider {
    fn schema(&self) -> Schema;

    /// The JSON document sent to Event Grid.
    fn to_json(&self) -> Result<Vec<u8>, serde_json::Error>;
}
