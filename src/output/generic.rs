use crate::data::RawValue;
use crate::eventgrid::EventProvider;
use serde::Serialize;

/// A named output binding holding one payload. Every output kind other than
/// HTTP shares this shape on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericOutput {
    name: String,
    binding_type: Option<String>,
    data: RawValue,
}

impl GenericOutput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A storage queue output binding.
    pub fn queue(name: impl Into<String>) -> Self {
        Self::new(name).with_binding_type("queue")
    }

    /// A Service Bus output binding.
    pub fn service_bus(name: impl Into<String>) -> Self {
        Self::new(name).with_binding_type("serviceBus")
    }

    /// An Event Grid output binding.
    pub fn event_grid(name: impl Into<String>) -> Self {
        Self::new(name).with_binding_type("eventGrid")
    }

    /// Set the `function.json` binding type.
    pub fn with_binding_type(mut self, binding_type: impl Into<String>) -> Self {
        self.binding_type = Some(binding_type.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<RawValue>) -> Self {
        self.data = data.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binding_type(&self) -> Option<&str> {
        self.binding_type.as_deref()
    }

    pub fn data(&self) -> &RawValue {
        &self.data
    }

    /// Replace the payload.
    pub fn write(&mut self, data: impl Into<RawValue>) {
        self.data = data.into();
    }

    /// Replace the payload with the JSON encoding of `value`.
    pub fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), serde_json::Error> {
        self.data = serde_json::to_vec(value)?.into();
        Ok(())
    }

    /// Replace the payload with an Event Grid event.
    pub fn write_event(&mut self, event: &impl EventProvider) -> Result<(), serde_json::Error> {
        self.data = event.to_json()?.into();
        Ok(())
    }
}
