//! Errors raised while turning a host request into a trigger.

use thiserror::Error;

/// Failure to decode or interpret an incoming trigger.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// The request body is not a valid invocation envelope.
    #[error("trigger payload malformed: {0}")]
    PayloadMalformed(String),
    /// The requested binding name is absent from the envelope data.
    #[error("trigger name incorrect: no binding named '{0}' in request")]
    NameMismatch(String),
    /// The payload does not match the shape of the requested type.
    #[error("failed to deserialize trigger data: {0}")]
    Deserialization(#[source] serde_json::Error),
    /// The HTTP trigger carries a Content-Type that the helper cannot handle.
    #[error("invalid Content-Type: {0}")]
    InvalidContentType(String),
    /// The HTTP trigger body could not be parsed as the expected form.
    #[error("invalid body: {0}")]
    InvalidBody(String),
}

impl TriggerError {
    pub(crate) fn malformed(err: impl std::fmt::Display) -> Self {
        TriggerError::PayloadMalformed(err.to_string())
    }
}
