//! Tracking payload sent to the collector.
//!
//! The body shape is `{click_id, event_type, event_value}`, where
//! `event_value` is itself a JSON document encoded as a string (or `null`).
//! The double encoding is kept for compatibility with existing collectors.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::EventType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingPayload {
    pub click_id: i64,
    pub event_type: EventType,
    pub event_value: Option<String>,
}

impl TrackingPayload {
    /// Build a payload from an already structured value.
    ///
    /// `None` and JSON `null` both produce `event_value: null`.
    pub fn new(click_id: i64, event_type: EventType, value: Option<serde_json::Value>) -> Self {
        let event_value = match value {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => Some(value.to_string()),
        };
        Self {
            click_id,
            event_type,
            event_value,
        }
    }

    /// Build a payload from any serializable record.
    pub fn from_record<T: Serialize>(
        click_id: i64,
        event_type: EventType,
        record: &T,
    ) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(record)?;
        Ok(Self::new(click_id, event_type, Some(value)))
    }

    /// Decode the inner `event_value` document into `T`.
    pub fn decode_value<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.event_value
            .as_deref()
            .map(serde_json::from_str::<T>)
            .transpose()
    }

    /// Serialize the full body as sent over the wire.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
