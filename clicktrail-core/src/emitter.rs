//! Event emission.
//!
//! The emitter turns an event type and value into a [`TrackingPayload`] and
//! hands it to the [`Transport`]. Ordinary emissions are spawned and never
//! awaited by the caller; failures are logged and dropped. Spawned
//! deliveries are tracked so page exit can wait for them before the runtime
//! goes away. The reliable path is awaited and is reserved for page exit.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clicktrail_sdk::objects::{EventType, TrackingPayload};
use serde::Serialize;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};

use crate::identifier::ClickId;
use crate::transport::Transport;

#[derive(Clone)]
pub struct Emitter {
    click_id: Option<ClickId>,
    transport: Arc<dyn Transport>,
    in_flight: TaskTracker,
    missing_id_logged: Arc<AtomicBool>,
}

impl Emitter {
    pub fn new(click_id: Option<ClickId>, transport: Arc<dyn Transport>) -> Self {
        Self {
            click_id,
            transport,
            in_flight: TaskTracker::new(),
            missing_id_logged: Arc::new(AtomicBool::new(false)),
        }
    }

    /// An emitter with no identifier whose missing-id diagnostic has
    /// already been reported by the caller.
    pub(crate) fn disabled(transport: Arc<dyn Transport>) -> Self {
        Self {
            click_id: None,
            transport,
            in_flight: TaskTracker::new(),
            missing_id_logged: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn click_id(&self) -> Option<ClickId> {
        self.click_id
    }

    pub fn is_enabled(&self) -> bool {
        self.click_id.is_some()
    }

    /// Send an event without waiting for the delivery to finish.
    ///
    /// Must be called from within a tokio runtime.
    pub fn emit(&self, event_type: EventType, value: Option<serde_json::Value>) {
        let Some(payload) = self.payload(event_type, value) else {
            return;
        };

        let transport = Arc::clone(&self.transport);
        self.in_flight.spawn(async move {
            if let Err(e) = transport.deliver(&payload).await {
                warn!(
                    click_id = payload.click_id,
                    event_type = %payload.event_type,
                    error = %e,
                    "Failed to deliver tracking event"
                );
            }
        });
    }

    /// Number of ordinary deliveries still running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Wait up to `timeout` for ordinary deliveries that are still running.
    ///
    /// Returns how many were still pending when the wait gave up. Emissions
    /// made after this call are still spawned and tracked.
    pub async fn drain(&self, timeout: Duration) -> usize {
        self.in_flight.close();
        if tokio::time::timeout(timeout, self.in_flight.wait())
            .await
            .is_ok()
        {
            return 0;
        }

        let pending = self.in_flight.len();
        warn!(pending, ?timeout, "Gave up waiting for in-flight deliveries");
        pending
    }

    /// [`emit`](Self::emit) for any serializable record.
    pub fn emit_record<T: Serialize>(&self, event_type: EventType, record: &T) {
        match serde_json::to_value(record) {
            Ok(value) => self.emit(event_type, Some(value)),
            Err(e) => error!(%event_type, error = %e, "Failed to serialize event value"),
        }
    }

    /// Deliver through the teardown-safe path and wait for the attempt.
    ///
    /// Returns whether the collector accepted the event.
    pub async fn emit_reliable<T: Serialize>(&self, event_type: EventType, record: &T) -> bool {
        let value = match serde_json::to_value(record) {
            Ok(value) => value,
            Err(e) => {
                error!(%event_type, error = %e, "Failed to serialize event value");
                return false;
            }
        };
        let Some(payload) = self.payload(event_type, Some(value)) else {
            return false;
        };

        match self.transport.deliver_reliable(&payload).await {
            Ok(()) => {
                debug!(
                    click_id = payload.click_id,
                    event_type = %payload.event_type,
                    "Delivered event through reliable path"
                );
                true
            }
            Err(e) => {
                warn!(
                    click_id = payload.click_id,
                    event_type = %payload.event_type,
                    error = %e,
                    "Reliable delivery failed"
                );
                false
            }
        }
    }

    fn payload(
        &self,
        event_type: EventType,
        value: Option<serde_json::Value>,
    ) -> Option<TrackingPayload> {
        let Some(click_id) = self.click_id else {
            if !self.missing_id_logged.swap(true, Ordering::Relaxed) {
                warn!(%event_type, "Click id not found, event will not be tracked");
            }
            return None;
        };
        Some(TrackingPayload::new(click_id.get(), event_type, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingTransport, settle};
    use serde_json::json;

    #[tokio::test]
    async fn emit_builds_double_encoded_payload() {
        let transport = RecordingTransport::new();
        let emitter = Emitter::new(ClickId::new(12), transport.clone());

        emitter.emit(EventType::Purchase, Some(json!({"total": 10})));
        settle().await;

        let sent = transport.normal();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].click_id, 12);
        assert_eq!(sent[0].event_type, EventType::Purchase);
        assert_eq!(sent[0].event_value.as_deref(), Some(r#"{"total":10}"#));
    }

    #[tokio::test]
    async fn emit_without_click_id_sends_nothing() {
        let transport = RecordingTransport::new();
        let emitter = Emitter::new(None, transport.clone());

        emitter.emit(EventType::Pageview, None);
        emitter.emit(EventType::Scroll, None);
        settle().await;

        assert_eq!(transport.total_calls(), 0);
        assert!(emitter.missing_id_logged.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn delivery_failure_is_not_surfaced() {
        let transport = RecordingTransport::failing();
        let emitter = Emitter::new(ClickId::new(1), transport.clone());

        emitter.emit(EventType::Call, None);
        settle().await;

        assert_eq!(transport.normal().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_waits_for_slow_deliveries() {
        let transport = RecordingTransport::with_delay(Duration::from_millis(50));
        let emitter = Emitter::new(ClickId::new(4), transport.clone());

        emitter.emit(EventType::Whatsapp, None);
        assert_eq!(emitter.in_flight(), 1);

        assert_eq!(emitter.drain(Duration::from_secs(2)).await, 0);
        assert_eq!(transport.normal().len(), 1);
        assert_eq!(emitter.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_gives_up_after_timeout() {
        let transport = RecordingTransport::with_delay(Duration::from_secs(10));
        let emitter = Emitter::new(ClickId::new(4), transport.clone());

        emitter.emit(EventType::Download, None);
        assert_eq!(emitter.drain(Duration::from_millis(500)).await, 1);
        assert!(transport.normal().is_empty());
    }

    #[tokio::test]
    async fn reliable_path_reports_outcome() {
        let ok = RecordingTransport::new();
        let emitter = Emitter::new(ClickId::new(1), ok.clone());
        assert!(emitter.emit_reliable(EventType::Pageview, &json!({"time_on_page": 3})).await);
        assert_eq!(ok.reliable().len(), 1);
        assert!(ok.normal().is_empty());

        let failing = RecordingTransport::failing();
        let emitter = Emitter::new(ClickId::new(1), failing.clone());
        assert!(!emitter.emit_reliable(EventType::Pageview, &json!({"time_on_page": 3})).await);
    }
}
