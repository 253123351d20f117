//! Generic trigger for binding kinds without dedicated metadata.

use crate::data::RawValue;
use crate::envelope::{Invocation, Metadata};
use crate::trigger::{SysMetadata, Trigger, TriggerError, TriggerKind};
use serde::Deserialize;

/// A trigger exposing its payload and the metadata exactly as sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericTrigger {
    data: RawValue,
    /// Invocation metadata.
    pub metadata: Metadata,
}

impl GenericTrigger {
    /// The `sys` block of the metadata.
    pub fn sys(&self) -> SysMetadata {
        self.metadata
            .get("sys")
            .and_then(|sys| SysMetadata::deserialize(sys).ok())
            .unwrap_or_default()
    }
}

impl Trigger for GenericTrigger {
    const KIND: TriggerKind = TriggerKind::Generic;

    fn from_invocation(invocation: Invocation) -> Result<Self, TriggerError> {
        let (data, metadata) = invocation.into_parts();
        Ok(Self { data, metadata })
    }

    fn data(&self) -> &RawValue {
        &self.data
    }
}
