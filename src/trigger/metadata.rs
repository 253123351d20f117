//! Metadata fields the host attaches to every invocation.

use crate::trigger::fields;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The `sys` block of the invocation metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SysMetadata {
    /// Name of the function being invoked.
    #[serde(default, deserialize_with = "fields::null_default")]
    pub method_name: String,
    /// Host clock at invocation time.
    #[serde(default, deserialize_with = "fields::flexible_utc")]
    pub utc_now: Option<DateTime<Utc>>,
    /// Random identifier generated by the host for the invocation.
    #[serde(default, deserialize_with = "fields::null_default")]
    pub rand_guid: String,
}
