use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clicktrail_sdk::client::{ClientError, StatusCode};
use clicktrail_sdk::objects::TrackingPayload;
use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::transport::{Transport, TransportError};

/// Transport that records every payload it delivers.
///
/// With a delay, a payload is recorded only once the simulated request
/// has completed.
#[derive(Default)]
pub struct RecordingTransport {
    normal: Mutex<Vec<TrackingPayload>>,
    reliable: Mutex<Vec<TrackingPayload>>,
    fail: bool,
    delay: Duration,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    pub fn normal(&self) -> Vec<TrackingPayload> {
        self.normal.lock().clone()
    }

    pub fn reliable(&self) -> Vec<TrackingPayload> {
        self.reliable.lock().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.normal.lock().len() + self.reliable.lock().len()
    }

    fn outcome(&self) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::Client(ClientError::Api {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "collector down".to_string(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn deliver(&self, payload: &TrackingPayload) -> Result<(), TransportError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.normal.lock().push(payload.clone());
        self.outcome()
    }

    async fn deliver_reliable(&self, payload: &TrackingPayload) -> Result<(), TransportError> {
        self.reliable.lock().push(payload.clone());
        self.outcome()
    }
}

/// Let spawned deliveries run to completion.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Collects log records emitted on the current thread.
#[derive(Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<(Level, String)>>>,
}

impl LogCapture {
    /// Install as the thread's default subscriber until the guard drops.
    pub fn install(&self) -> DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    /// Messages logged at exactly `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.records
            .lock()
            .push((*event.metadata().level(), visitor.message));
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}
