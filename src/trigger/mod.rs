//! Typed, read-only views over a decoded trigger.
//!
//! Every trigger kind is built once per invocation from an [`Invocation`]
//! and shares the [`Trigger`] capability: access to the payload bytes and
//! structural parsing of them into a caller type.

mod error;
mod event_grid;
pub(crate) mod fields;
mod generic;
mod http;
mod metadata;
mod queue;
mod service_bus;
mod time;
mod timer;

pub use error::TriggerError;
pub use event_grid::{EventGridMetadata, EventGridTrigger};
pub use generic::GenericTrigger;
pub use http::{FormFile, FormValues, HttpIdentity, HttpIdentityClaim, HttpMetadata, HttpTrigger, MultipartForm};
pub use metadata::SysMetadata;
pub use queue::{QueueMetadata, QueueTrigger};
pub use service_bus::{ServiceBusClient, ServiceBusMetadata, ServiceBusTrigger};
pub use time::IsoTimestamp;
pub use timer::{TimerSchedule, TimerScheduleStatus, TimerTrigger};
pub(crate) use timer::TIMER_BINDING;

use crate::data::RawValue;
use crate::envelope::Invocation;
use serde::de::DeserializeOwned;
use std::fmt;

/// The closed set of trigger kinds a function can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    Http,
    Queue,
    ServiceBus,
    Timer,
    EventGrid,
    Generic,
}

impl TriggerKind {
    /// The `function.json` binding type, if the kind has a fixed one.
    pub fn binding_type(&self) -> Option<&'static str> {
        match self {
            TriggerKind::Http => Some("httpTrigger"),
            TriggerKind::Queue => Some("queueTrigger"),
            TriggerKind::ServiceBus => Some("serviceBusTrigger"),
            TriggerKind::Timer => Some("timerTrigger"),
            TriggerKind::EventGrid => Some("eventGridTrigger"),
            TriggerKind::Generic => None,
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriggerKind::Http => "http",
            TriggerKind::Queue => "queue",
            TriggerKind::ServiceBus => "serviceBus",
            TriggerKind::Timer => "timer",
            TriggerKind::EventGrid => "eventGrid",
            TriggerKind::Generic => "generic",
        };
        f.write_str(name)
    }
}

/// Capability shared by all trigger kinds.
pub trait Trigger: Sized + Send + 'static {
    /// The kind this type decodes.
    const KIND: TriggerKind;

    /// Build the trigger from a decoded invocation.
    fn from_invocation(invocation: Invocation) -> Result<Self, TriggerError>;

    /// The payload carried by the trigger.
    fn data(&self) -> &RawValue;

    /// Parse the payload into `T`.
    fn parse<T: DeserializeOwned>(&self) -> Result<T, TriggerError> {
        serde_json::from_slice(self.data()).map_err(TriggerError::Deserialization)
    }

    /// Parse the payload into an existing `target`, replacing its value.
    fn parse_into<T: DeserializeOwned>(&self, target: &mut T) -> Result<(), TriggerError> {
        *target = self.parse()?;
        Ok(())
    }

    /// Decode a request body and build the trigger for `binding_name`.
    fn decode(body: &[u8], binding_name: &str) -> Result<Self, TriggerError> {
        Self::from_invocation(Invocation::decode(body, binding_name)?)
    }
}
