//! Service Bus trigger, for both queues and topic subscriptions.

use crate::data::RawValue;
use crate::envelope::{Invocation, Metadata};
use crate::trigger::time::{self, IsoTimestamp};
use crate::trigger::{fields, SysMetadata, Trigger, TriggerError, TriggerKind};
use serde::{Deserialize, Serialize};

/// A Service Bus message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceBusTrigger {
    data: RawValue,
    pub metadata: ServiceBusMetadata,
}

/// Metadata the host sends with a Service Bus message.
///
/// Timestamps keep the form they arrived in, so serializing the metadata
/// reproduces `2023-10-12T20:13:49` and `2023-10-12T20:13:49+00:00` as sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceBusMetadata {
    #[serde(default, deserialize_with = "fields::null_default")]
    pub client: ServiceBusClient,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_receiver: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_session: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_actions: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_actions: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receive_actions: Option<Metadata>,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub application_properties: Metadata,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub user_properties: Metadata,
    #[serde(default, deserialize_with = "fields::lenient_u64")]
    pub delivery_count: Option<u64>,
    #[serde(default, deserialize_with = "fields::unquoted")]
    pub lock_token: String,
    #[serde(default, deserialize_with = "fields::unquoted")]
    pub message_id: String,
    #[serde(default, deserialize_with = "fields::unquoted")]
    pub content_type: String,
    #[serde(default, deserialize_with = "fields::lenient_u64")]
    pub sequence_number: Option<u64>,
    #[serde(rename = "ExpiresAtUtc", default, deserialize_with = "time::optional_iso")]
    pub expires_at_utc: Option<IsoTimestamp>,
    #[serde(default, deserialize_with = "time::optional_iso")]
    pub expires_at: Option<IsoTimestamp>,
    #[serde(rename = "EnqueuedTimeUtc", default, deserialize_with = "time::optional_iso")]
    pub enqueued_time_utc: Option<IsoTimestamp>,
    #[serde(default, deserialize_with = "time::optional_iso")]
    pub enqueued_time: Option<IsoTimestamp>,
    #[serde(rename = "sys", default)]
    pub sys: SysMetadata,
    #[serde(flatten)]
    pub extra: Metadata,
}

/// The receiving client described in the metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceBusClient {
    #[serde(default, deserialize_with = "fields::null_default")]
    pub fully_qualified_namespace: String,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub identifier: String,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub transport_type: i64,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub is_closed: bool,
}

impl Trigger for ServiceBusTrigger {
    const KIND: TriggerKind = TriggerKind::ServiceBus;

    fn from_invocation(invocation: Invocation) -> Result<Self, TriggerError> {
        let metadata = invocation.metadata_as::<ServiceBusMetadata>()?;
        let (data, _) = invocation.into_parts();
        Ok(Self { data, metadata })
    }

    fn data(&self) -> &RawValue {
        &self.data
    }
}
