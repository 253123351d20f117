//! Inbound invocation envelope.
//!
//! Every host request carries one JSON object with a `Data` mapping from
//! binding name to wire value and a free-form `Metadata` object. Decoding
//! selects one binding by name and runs its wire value through the
//! [`RawValue`] codec.

use crate::data::RawValue;
use crate::trigger::{SysMetadata, TriggerError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Free-form metadata of an invocation.
pub type Metadata = Map<String, Value>;

#[derive(Deserialize)]
struct InboundEnvelope {
    #[serde(rename = "Data", default)]
    data: Option<HashMap<String, Box<serde_json::value::RawValue>>>,
    #[serde(rename = "Metadata", default)]
    metadata: Option<Metadata>,
}

/// One decoded binding of an invocation together with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    name: String,
    payload: RawValue,
    metadata: Metadata,
}

impl Invocation {
    /// Decode a request body and select the binding called `binding_name`.
    pub fn decode(body: &[u8], binding_name: &str) -> Result<Self, TriggerError> {
        let envelope: InboundEnvelope =
            serde_json::from_slice(body).map_err(TriggerError::malformed)?;

        let token = envelope
            .data
            .unwrap_or_default()
            .remove(binding_name)
            .ok_or_else(|| TriggerError::NameMismatch(binding_name.to_string()))?;

        Ok(Self {
            name: binding_name.to_string(),
            payload: RawValue::decode(token.get()),
            metadata: envelope.metadata.unwrap_or_default(),
        })
    }

    /// Name of the selected binding.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The decoded payload of the selected binding.
    pub fn payload(&self) -> &RawValue {
        &self.payload
    }

    /// The invocation metadata, as sent by the host.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The `sys` block of the metadata.
    pub fn sys(&self) -> Result<SysMetadata, TriggerError> {
        match self.metadata.get("sys") {
            Some(sys) => SysMetadata::deserialize(sys).map_err(TriggerError::malformed),
            None => Ok(SysMetadata::default()),
        }
    }

    /// Interpret the payload as a structured trigger document.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, TriggerError> {
        serde_json::from_slice(&self.payload).map_err(TriggerError::malformed)
    }

    /// Interpret the metadata as a kind-specific structure.
    pub fn metadata_as<T: DeserializeOwned>(&self) -> Result<T, TriggerError> {
        T::deserialize(&Value::Object(self.metadata.clone())).map_err(TriggerError::malformed)
    }

    /// Split into payload and metadata.
    pub fn into_parts(self) -> (RawValue, Metadata) {
        (self.payload, self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_selects_binding() {
        let body = br#"{"Data":{"base":"hello"},"Metadata":{}}"#;
        let invocation = Invocation::decode(body, "base").unwrap();
        assert_eq!(invocation.name(), "base");
        assert_eq!(invocation.payload().as_bytes(), b"hello");
        assert!(invocation.metadata().is_empty());
    }

    #[test]
    fn test_decode_name_mismatch() {
        let body = br#"{"Data":{"base":"hello"},"Metadata":{}}"#;
        let err = Invocation::decode(body, "other").unwrap_err();
        assert!(matches!(err, TriggerError::NameMismatch(ref name) if name == "other"));
    }

    #[test]
    fn test_decode_malformed() {
        let err = Invocation::decode(b"not json", "base").unwrap_err();
        assert!(matches!(err, TriggerError::PayloadMalformed(_)));

        let err = Invocation::decode(br#"{"Data":["base"]}"#, "base").unwrap_err();
        assert!(matches!(err, TriggerError::PayloadMalformed(_)));
    }

    #[test]
    fn test_decode_missing_data_is_name_mismatch() {
        let err = Invocation::decode(br#"{"Metadata":{}}"#, "base").unwrap_err();
        assert!(matches!(err, TriggerError::NameMismatch(_)));
    }

    #[test]
    fn test_decode_escaped_json_payload() {
        let body = br#"{"Data":{"queue":"{\"message\":\"hi\"}"},"Metadata":{}}"#;
        let invocation = Invocation::decode(body, "queue").unwrap();
        assert_eq!(invocation.payload().as_bytes(), br#"{"message":"hi"}"#);
    }

    #[test]
    fn test_sys_metadata() {
        let body = br#"{
            "Data": {"queue": "hello"},
            "Metadata": {
                "sys": {
                    "MethodName": "helloQueue",
                    "UtcNow": "2023-10-12T20:13:49.640002Z",
                    "RandGuid": "4e773554-f6b7-4ea2-b07d-4c5fd5aba741"
                }
            }
        }"#;
        let sys = Invocation::decode(body, "queue").unwrap().sys().unwrap();
        assert_eq!(sys.method_name, "helloQueue");
        assert_eq!(sys.rand_guid, "4e773554-f6b7-4ea2-b07d-4c5fd5aba741");
        assert!(sys.utc_now.is_some());
    }
}
