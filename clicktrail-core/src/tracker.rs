//! The tracker handle embedded by the host page.
//!
//! [`Tracker::start`] resolves the click identifier, sends the initial
//! `pageview` and spawns the [`PageSession`] processor. The host forwards
//! page signals through the handle and calls [`Tracker::exit`] when the page
//! is torn down.

use std::sync::Arc;
use std::time::Duration;

use clicktrail_sdk::client::{ClientError, TrackingClient};
use clicktrail_sdk::objects::{EventType, PageviewStart, RECOMMENDED_CONVERSIONS};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, TrackerConfig};
use crate::emitter::Emitter;
use crate::events::{PageSignal, PageSignalSender, page_signal_channel};
use crate::identifier::{ClickId, ClickIdStorage, IdentifierResolver, PageContext};
use crate::interaction::{ClickTarget, Element, InteractionDetector};
use crate::processors::{PageSession, SessionSummary};
use crate::scroll::ScrollMetrics;
use crate::transport::Transport;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Invalid tracker configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid href pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Invalid tracking endpoint: {0}")]
    Endpoint(#[from] ClientError),
}

/// Malformed input on the custom conversion API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Event type must be a string, got {kind}: {value}")]
    NonStringEventType {
        kind: &'static str,
        value: serde_json::Value,
    },
}

pub struct Tracker {
    emitter: Emitter,
    signal_tx: Option<PageSignalSender>,
    session: Option<JoinHandle<SessionSummary>>,
    drain_timeout: Duration,
}

impl Tracker {
    /// Start tracking a page view.
    ///
    /// When no click identifier can be resolved the returned tracker is
    /// disabled: every operation is a no-op and nothing is sent.
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: &TrackerConfig,
        page: PageContext,
        storage: Arc<dyn ClickIdStorage>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, TrackerError> {
        config.validate()?;
        let detector = InteractionDetector::new(config, page.url.clone())?;

        let resolver = IdentifierResolver::from_config(config);
        let Some(click_id) = resolver.resolve_and_persist(&page, storage.as_ref()) else {
            warn!(
                url = %page.url,
                query_param = %config.click_id_param,
                "No click id found, tracking disabled for this page view"
            );
            return Ok(Self {
                emitter: Emitter::disabled(transport),
                signal_tx: None,
                session: None,
                drain_timeout: config.exit_drain_timeout(),
            });
        };

        let emitter = Emitter::new(Some(click_id), transport);
        emitter.emit_record(
            EventType::Pageview,
            &PageviewStart {
                url: page.url.to_string(),
                referrer: page.referrer.clone(),
                timestamp: OffsetDateTime::now_utc(),
            },
        );

        let (signal_tx, signal_rx) = page_signal_channel();
        let session = PageSession::new(emitter.clone(), detector, config, Instant::now());
        let handle = tokio::spawn(session.run(signal_rx));

        info!(%click_id, url = %page.url, "Tracker started");

        Ok(Self {
            emitter,
            signal_tx: Some(signal_tx),
            session: Some(handle),
            drain_timeout: config.exit_drain_timeout(),
        })
    }

    /// Start tracking with an HTTP client posting to the configured
    /// endpoint, resolved against the page URL.
    pub fn start_http(
        config: &TrackerConfig,
        page: PageContext,
        storage: Arc<dyn ClickIdStorage>,
    ) -> Result<Self, TrackerError> {
        let client = TrackingClient::for_page(&page.url, &config.endpoint)?;
        debug!(endpoint = %client.endpoint(), "Using HTTP transport");
        Self::start(config, page, storage, Arc::new(client))
    }

    pub fn click_id(&self) -> Option<ClickId> {
        self.emitter.click_id()
    }

    /// Whether a click id was resolved and events are being sent.
    pub fn is_enabled(&self) -> bool {
        self.emitter.is_enabled()
    }

    pub fn scroll(&self, metrics: ScrollMetrics) {
        self.signal(PageSignal::Scroll(metrics));
    }

    pub fn click(&self, target: ClickTarget) {
        self.signal(PageSignal::Click(target));
    }

    pub fn submit(&self, form: Element) {
        self.signal(PageSignal::Submit(form));
    }

    /// Record a conversion reported by a host script.
    pub fn track_conversion(&self, event_type: EventType, value: Option<serde_json::Value>) {
        if !event_type.is_recommended_conversion() {
            warn!(
                %event_type,
                recommended = ?RECOMMENDED_CONVERSIONS,
                "Conversion type is not one of the recommended types"
            );
        }
        self.emitter.emit(event_type, value);
    }

    /// [`track_conversion`](Self::track_conversion) for untyped input from
    /// the host bridge. A non-string event type is logged and ignored.
    pub fn track_conversion_json(
        &self,
        event_type: &serde_json::Value,
        value: Option<serde_json::Value>,
    ) -> Result<(), ConversionError> {
        let Some(name) = event_type.as_str() else {
            let err = ConversionError::NonStringEventType {
                kind: json_kind(event_type),
                value: event_type.clone(),
            };
            error!(error = %err, "Rejected custom conversion");
            return Err(err);
        };

        self.track_conversion(EventType::from(name), value);
        Ok(())
    }

    /// Signal page teardown and wait for the final delivery.
    ///
    /// Events emitted just before teardown, such as the click that navigates
    /// away, are given up to the configured drain timeout to finish so the
    /// host can drop the runtime once this returns.
    ///
    /// Returns the session summary, or `None` when tracking was disabled or
    /// the tracker already exited.
    pub async fn exit(&mut self) -> Option<SessionSummary> {
        let signal_tx = self.signal_tx.take()?;
        if signal_tx.send(PageSignal::Unload).await.is_err() {
            debug!("PageSession already stopped before unload");
        }
        drop(signal_tx);

        let handle = self.session.take()?;
        let summary = match handle.await {
            Ok(summary) => Some(summary),
            Err(e) => {
                error!(error = %e, "PageSession task failed");
                None
            }
        };

        let pending = self.emitter.drain(self.drain_timeout).await;
        debug!(pending, "Tracker exited");
        summary
    }

    fn signal(&self, signal: PageSignal) {
        let Some(signal_tx) = &self.signal_tx else {
            debug!(kind = signal.kind(), "Ignoring page signal, tracker is not running");
            return;
        };

        match signal_tx.try_send(signal) {
            Ok(()) => {}
            Err(TrySendError::Full(signal)) => {
                warn!(kind = signal.kind(), "PageSignal channel full, dropping signal");
            }
            Err(TrySendError::Closed(signal)) => {
                debug!(kind = signal.kind(), "PageSession stopped, dropping signal");
            }
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
