//! Timer trigger.

use crate::data::RawValue;
use crate::envelope::Invocation;
use crate::trigger::{fields, SysMetadata, Trigger, TriggerError, TriggerKind};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Binding name the host uses for timer payloads.
pub(crate) const TIMER_BINDING: &str = "timer";

/// A scheduled invocation. Carries no payload; use the fields directly.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimerTrigger {
    #[serde(default, deserialize_with = "fields::null_default")]
    pub schedule: TimerSchedule,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub schedule_status: TimerScheduleStatus,
    #[serde(default, deserialize_with = "fields::null_default")]
    pub is_past_due: bool,
    #[serde(skip)]
    pub sys: SysMetadata,
    #[serde(skip)]
    data: RawValue,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TimerSchedule {
    #[serde(rename = "AdjustForDST", default, deserialize_with = "fields::null_default")]
    pub adjust_for_dst: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimerScheduleStatus {
    #[serde(default, deserialize_with = "fields::flexible_utc")]
    pub last: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "fields::flexible_utc")]
    pub next: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "fields::flexible_utc")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Trigger for TimerTrigger {
    const KIND: TriggerKind = TriggerKind::Timer;

    fn from_invocation(invocation: Invocation) -> Result<Self, TriggerError> {
        let mut trigger = invocation.payload_as::<TimerTrigger>()?;
        trigger.sys = invocation.sys()?;
        Ok(trigger)
    }

    fn data(&self) -> &RawValue {
        &self.data
    }

    /// A timer has nothing to parse; `T` is built as if from `null`.
    fn parse<T: DeserializeOwned>(&self) -> Result<T, TriggerError> {
        serde_json::from_value(Value::Null).map_err(TriggerError::Deserialization)
    }

    /// A timer has nothing to parse; `target` is left as it is.
    fn parse_into<T: DeserializeOwned>(&self, _target: &mut T) -> Result<(), TriggerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: &[u8] = br#"{
        "Data": {
            "timer": {
                "Schedule": {
                    "AdjustForDST": true
                },
                "ScheduleStatus": {
                    "Last": "2023-10-12T20:13:49.640002Z",
                    "Next": "2023-10-12T20:13:49.640002Z",
                    "LastUpdated": "2023-10-12T20:13:49.640002Z"
                },
                "IsPastDue": false
            }
        },
        "Metadata": {
            "sys": {
                "MethodName": "helloTimer",
                "UtcNow": "2023-10-12T20:13:49.640002Z",
                "RandGuid": "4e773554-f6b7-4ea2-b07d-4c5fd5aba741"
            }
        }
    }"#;

    #[test]
    fn test_timer_trigger() {
        let trigger = TimerTrigger::decode(REQUEST, TIMER_BINDING).unwrap();

        assert!(trigger.schedule.adjust_for_dst);
        assert!(!trigger.is_past_due);
        assert_eq!(
            trigger.schedule_status.last.unwrap().to_rfc3339(),
            "2023-10-12T20:13:49.640002+00:00"
        );
        assert_eq!(trigger.schedule_status.next, trigger.schedule_status.last_updated);
        assert_eq!(trigger.sys.method_name, "helloTimer");
        assert!(trigger.data().is_empty());
    }

    #[test]
    fn test_timer_parse_is_noop() {
        let trigger = TimerTrigger::decode(REQUEST, TIMER_BINDING).unwrap();
        let unit: Option<String> = trigger.parse().unwrap();
        assert!(unit.is_none());
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Job {
        name: String,
        runs: u32,
    }

    #[test]
    fn test_timer_parse_into_leaves_target() {
        let trigger = TimerTrigger::decode(REQUEST, TIMER_BINDING).unwrap();
        let mut job = Job {
            name: "cleanup".into(),
            runs: 3,
        };

        trigger.parse_into(&mut job).unwrap();
        assert_eq!(
            job,
            Job {
                name: "cleanup".into(),
                runs: 3
            }
        );
    }

    #[test]
    fn test_timer_payload_must_be_an_object() {
        let body = br#"{"Data":{"timer":"not a timer"},"Metadata":{}}"#;
        let err = TimerTrigger::decode(body, TIMER_BINDING).unwrap_err();
        assert!(matches!(err, TriggerError::PayloadMalformed(_)));
    }
}
