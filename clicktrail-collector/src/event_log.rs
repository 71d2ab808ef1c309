//! Bounded in-memory log of received tracking events.

use std::collections::VecDeque;
use std::convert::Infallible;

use clicktrail_sdk::objects::{EventType, TrackingPayload};
use kanau::processor::Processor;
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

/// An event as stored by the collector, with its value decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredEvent {
    pub id: Uuid,
    pub click_id: i64,
    pub event_type: EventType,
    pub event_value: Option<serde_json::Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
/// Store a payload received from a tracker.
pub struct IngestEvent {
    pub payload: TrackingPayload,
}

#[derive(Debug, Clone)]
/// List stored events, oldest first, optionally for one click only.
pub struct ListEvents {
    pub click_id: Option<i64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("click_id must be positive, got {0}")]
    InvalidClickId(i64),
}

pub struct EventLog {
    inner: Mutex<Inner>,
}

struct Inner {
    events: VecDeque<StoredEvent>,
    capacity: usize,
}

impl EventLog {
    /// Create an empty log. A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                events: VecDeque::with_capacity(capacity.min(1024)),
                capacity,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    /// Change the capacity, evicting the oldest events if it shrank.
    pub fn set_capacity(&self, capacity: usize) {
        let mut inner = self.inner.lock();
        inner.capacity = capacity.max(1);
        let evicted = inner.evict();
        debug!(capacity = inner.capacity, evicted, "Event log capacity updated");
    }
}

impl Inner {
    fn evict(&mut self) -> usize {
        let excess = self.events.len().saturating_sub(self.capacity);
        self.events.drain(..excess);
        excess
    }
}

/// Decode the double-encoded value. A string that is not itself JSON is kept
/// as a JSON string, and an encoded `null` is the same as no value.
fn decode_event_value(raw: Option<String>) -> Option<serde_json::Value> {
    let raw = raw?;
    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Null) => None,
        Ok(value) => Some(value),
        Err(_) => Some(serde_json::Value::String(raw)),
    }
}

impl Processor<IngestEvent> for EventLog {
    type Output = StoredEvent;
    type Error = IngestError;

    async fn process(&self, event: IngestEvent) -> Result<StoredEvent, IngestError> {
        let TrackingPayload {
            click_id,
            event_type,
            event_value,
        } = event.payload;

        if click_id <= 0 {
            return Err(IngestError::InvalidClickId(click_id));
        }

        let stored = StoredEvent {
            id: Uuid::now_v7(),
            click_id,
            event_type,
            event_value: decode_event_value(event_value),
            received_at: OffsetDateTime::now_utc(),
        };

        let mut inner = self.inner.lock();
        inner.events.push_back(stored.clone());
        let evicted = inner.evict();
        if evicted > 0 {
            debug!(evicted, "Evicted oldest events from the log");
        }
        Ok(stored)
    }
}

impl Processor<ListEvents> for EventLog {
    type Output = Vec<StoredEvent>;
    type Error = Infallible;

    async fn process(&self, query: ListEvents) -> Result<Vec<StoredEvent>, Infallible> {
        let inner = self.inner.lock();
        Ok(inner
            .events
            .iter()
            .filter(|e| query.click_id.is_none_or(|id| e.click_id == id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(click_id: i64, event_type: EventType, value: Option<&str>) -> IngestEvent {
        IngestEvent {
            payload: TrackingPayload {
                click_id,
                event_type,
                event_value: value.map(str::to_string),
            },
        }
    }

    #[tokio::test]
    async fn test_decodes_event_value() {
        let log = EventLog::new(10);
        let stored = log
            .process(payload(
                4,
                EventType::Scroll,
                Some(r#"{"depth":25,"scroll_percent":31}"#),
            ))
            .await
            .unwrap();
        assert_eq!(
            stored.event_value,
            Some(serde_json::json!({"depth": 25, "scroll_percent": 31}))
        );

        let stored = log
            .process(payload(4, EventType::Purchase, Some("not json")))
            .await
            .unwrap();
        assert_eq!(stored.event_value, Some(serde_json::json!("not json")));

        let stored = log
            .process(payload(4, EventType::Call, None))
            .await
            .unwrap();
        assert_eq!(stored.event_value, None);

        let stored = log
            .process(payload(4, EventType::Call, Some("null")))
            .await
            .unwrap();
        assert_eq!(stored.event_value, None);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_click_id() {
        let log = EventLog::new(10);
        let err = log
            .process(payload(0, EventType::Pageview, None))
            .await
            .unwrap_err();
        assert_eq!(err, IngestError::InvalidClickId(0));
        assert_eq!(log.len(), 0);
    }

    #[tokio::test]
    async fn test_evicts_oldest_and_filters_by_click() {
        let log = EventLog::new(3);
        for click_id in [1, 2, 1, 2] {
            log.process(payload(click_id, EventType::Pageview, None))
                .await
                .unwrap();
        }
        assert_eq!(log.len(), 3);

        let all = log.process(ListEvents { click_id: None }).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|e| e.click_id).collect();
        assert_eq!(ids, vec![2, 1, 2]);

        let ones = log.process(ListEvents { click_id: Some(1) }).await.unwrap();
        assert_eq!(ones.len(), 1);

        log.set_capacity(1);
        assert_eq!(log.len(), 1);
        let remaining = log.process(ListEvents { click_id: None }).await.unwrap();
        assert_eq!(remaining[0].click_id, 2);
    }
}
