use crate::data::RawValue;
use crate::output::{GenericOutput, HttpOutput, OutputBinding};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::error;

const EMPTY_ENVELOPE: &[u8] = br#"{"Outputs":{},"Logs":null,"ReturnValue":null}"#;

/// Accumulates everything a function sends back to the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Output {
    bindings: BTreeMap<String, GenericOutput>,
    http: Option<HttpOutput>,
    return_value: Value,
    logs: Vec<String>,
}

#[derive(Serialize)]
struct OutboundEnvelope<'a> {
    #[serde(rename = "Outputs")]
    outputs: BTreeMap<&'a str, OutboundValue<'a>>,
    #[serde(rename = "Logs")]
    logs: Option<&'a [String]>,
    #[serde(rename = "ReturnValue")]
    return_value: &'a Value,
}

#[derive(Serialize)]
#[serde(untagged)]
enum OutboundValue<'a> {
    Http(&'a HttpOutput),
    Data(&'a RawValue),
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector pre-seeded with declared bindings.
    pub fn with_bindings<I>(bindings: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<OutputBinding>,
    {
        let mut output = Self::new();
        for binding in bindings {
            output.add_binding(binding);
        }
        output
    }

    /// Register a binding. An HTTP binding takes the HTTP slot, replacing
    /// any previous one.
    pub fn add_binding(&mut self, binding: impl Into<OutputBinding>) {
        match binding.into() {
            OutputBinding::Http(http) => self.http = Some(http),
            OutputBinding::Generic(generic) => {
                self.bindings.insert(generic.name().to_string(), generic);
            }
        }
    }

    /// The named generic binding, created empty if absent.
    pub fn binding(&mut self, name: &str) -> &mut GenericOutput {
        self.bindings
            .entry(name.to_string())
            .or_insert_with(|| GenericOutput::new(name))
    }

    pub fn get_binding(&self, name: &str) -> Option<&GenericOutput> {
        self.bindings.get(name)
    }

    /// The HTTP slot, created with defaults on first use.
    pub fn http(&mut self) -> &mut HttpOutput {
        self.http.get_or_insert_with(HttpOutput::default)
    }

    /// The HTTP slot, if it has been set or touched.
    pub fn http_output(&self) -> Option<&HttpOutput> {
        self.http.as_ref()
    }

    pub fn set_return_value(&mut self, value: impl Into<Value>) {
        self.return_value = value.into();
    }

    pub fn return_value(&self) -> &Value {
        &self.return_value
    }

    /// Append a message to the logs shipped back to the host.
    pub fn log(&mut self, message: impl Into<String>) {
        self.logs.push(message.into());
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Encode the outbound envelope.
    ///
    /// Generic bindings contribute their payload; the HTTP slot, when
    /// present, contributes a response object under its own name and wins
    /// over a generic binding of the same name.
    pub fn serialize(&self) -> Bytes {
        let mut outputs: BTreeMap<&str, OutboundValue<'_>> = self
            .bindings
            .iter()
            .map(|(name, binding)| (name.as_str(), OutboundValue::Data(binding.data())))
            .collect();
        if let Some(http) = &self.http {
            outputs.insert(http.name(), OutboundValue::Http(http));
        }

        let envelope = OutboundEnvelope {
            outputs,
            logs: (!self.logs.is_empty()).then_some(self.logs.as_slice()),
            return_value: &self.return_value,
        };

        match serde_json::to_vec(&envelope) {
            Ok(encoded) => Bytes::from(encoded),
            Err(err) => {
                error!("Failed to serialize output envelope: {}", err);
                Bytes::from_static(EMPTY_ENVELOPE)
            }
        }
    }
}
