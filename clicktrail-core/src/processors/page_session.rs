//! PageSession processor.
//!
//! The PageSession is responsible for:
//! - Receiving `PageSignal` events from the host page
//! - Debouncing scroll signals and emitting `scroll` events for newly
//!   reached thresholds
//! - Emitting a `pageview` heartbeat with the time on page at a fixed interval
//! - Turning clicks and form submissions into conversion events
//! - Delivering the final `pageview` through the teardown-safe path on unload
//!
//! All mutable tracking state lives in this task, so no locking is needed.

use std::time::Duration;

use clicktrail_sdk::objects::{EventType, Heartbeat, PageExit, ScrollMilestone};
use time::OffsetDateTime;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::config::TrackerConfig;
use crate::emitter::Emitter;
use crate::events::{PageSignal, PageSignalReceiver};
use crate::interaction::{Conversion, InteractionDetector};
use crate::scroll::{ScrollDepth, ScrollMetrics};
use crate::utils::debounce::{Debounce, sleep_until_deadline};
use crate::utils::elapsed::time_on_page;

/// State of a page session when it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub time_on_page: u64,
    pub max_scroll_depth: u8,
    /// Whether the final page-exit event was accepted by the collector.
    pub exit_delivered: bool,
}

pub struct PageSession {
    emitter: Emitter,
    detector: InteractionDetector,
    scroll: ScrollDepth,
    debounce: Debounce<ScrollMetrics>,
    heartbeat_interval: Duration,
    started_at: Instant,
}

impl PageSession {
    /// Create a new PageSession.
    ///
    /// `config` must already be validated; a zero heartbeat interval is not
    /// accepted by the timer.
    pub fn new(
        emitter: Emitter,
        detector: InteractionDetector,
        config: &TrackerConfig,
        started_at: Instant,
    ) -> Self {
        Self {
            emitter,
            detector,
            scroll: ScrollDepth::new(&config.scroll_thresholds),
            debounce: Debounce::new(config.scroll_debounce()),
            heartbeat_interval: config.heartbeat_interval(),
            started_at,
        }
    }

    /// Run the session until the page unloads or every sender is dropped.
    pub async fn run(mut self, mut signal_rx: PageSignalReceiver) -> SessionSummary {
        info!(click_id = ?self.emitter.click_id(), "PageSession started");

        let mut heartbeat = tokio::time::interval_at(
            self.started_at + self.heartbeat_interval,
            self.heartbeat_interval,
        );
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let summary = loop {
            let scroll_deadline = self.debounce.deadline();

            // Timers first: a busy signal channel must not hold back the
            // heartbeat or a settled scroll burst.
            tokio::select! {
                biased;

                _ = heartbeat.tick() => self.heartbeat(),

                // Scroll burst settled, evaluate the latest position.
                _ = sleep_until_deadline(scroll_deadline) => {
                    if let Some(metrics) = self.debounce.take_expired(Instant::now()) {
                        self.evaluate_scroll(metrics);
                    }
                }

                signal = signal_rx.recv() => match signal {
                    Some(PageSignal::Unload) => break self.exit().await,
                    Some(signal) => self.handle(signal),
                    None => {
                        info!("PageSignal channel closed");
                        break self.summary(false);
                    }
                },
            }
        };

        info!(
            time_on_page = summary.time_on_page,
            max_scroll_depth = summary.max_scroll_depth,
            exit_delivered = summary.exit_delivered,
            "PageSession finished"
        );
        summary
    }

    fn handle(&mut self, signal: PageSignal) {
        debug!(kind = signal.kind(), "Received PageSignal");

        match signal {
            PageSignal::Scroll(metrics) => self.debounce.push(metrics, Instant::now()),
            PageSignal::Click(target) => {
                for conversion in self.detector.detect_click(&target, OffsetDateTime::now_utc()) {
                    self.emit_conversion(conversion);
                }
            }
            PageSignal::Submit(form) => {
                if let Some(conversion) = self.detector.detect_submit(&form, OffsetDateTime::now_utc())
                {
                    self.emit_conversion(conversion);
                }
            }
            PageSignal::Unload => {}
        }
    }

    fn evaluate_scroll(&mut self, metrics: ScrollMetrics) {
        let scroll_percent = metrics.scroll_percent();
        let reached = self.scroll.observe(scroll_percent);
        debug!(
            scroll_percent,
            reached = reached.len(),
            max_scroll_depth = self.scroll.max_depth(),
            "Evaluated scroll depth"
        );

        for milestone in reached {
            self.emitter.emit_record(
                EventType::Scroll,
                &ScrollMilestone {
                    depth: milestone.depth,
                    scroll_percent: milestone.scroll_percent,
                    timestamp: OffsetDateTime::now_utc(),
                },
            );
        }
    }

    fn heartbeat(&self) {
        let time_on_page = time_on_page(self.started_at, Instant::now());
        debug!(time_on_page, "Heartbeat");
        self.emitter.emit_record(
            EventType::Pageview,
            &Heartbeat {
                time_on_page,
                timestamp: OffsetDateTime::now_utc(),
            },
        );
    }

    fn emit_conversion(&self, conversion: Conversion) {
        let event_type = conversion.event_type();
        match conversion.to_value() {
            Ok(value) => {
                debug!(%event_type, "Detected conversion");
                self.emitter.emit(event_type, Some(value));
            }
            Err(e) => error!(%event_type, error = %e, "Failed to serialize conversion"),
        }
    }

    /// Deliver the final pageview. Pending scroll evaluations are dropped,
    /// as they would be in a closing page.
    async fn exit(&mut self) -> SessionSummary {
        if self.debounce.cancel().is_some() {
            debug!("Discarding pending scroll evaluation on unload");
        }

        let summary = self.summary(false);
        if summary.time_on_page == 0 {
            debug!("Page unloaded within the first second, skipping exit event");
            return summary;
        }

        let delivered = self
            .emitter
            .emit_reliable(
                EventType::Pageview,
                &PageExit {
                    time_on_page: summary.time_on_page,
                    max_scroll_depth: summary.max_scroll_depth,
                    timestamp: OffsetDateTime::now_utc(),
                },
            )
            .await;

        SessionSummary {
            exit_delivered: delivered,
            ..summary
        }
    }

    fn summary(&self, exit_delivered: bool) -> SessionSummary {
        SessionSummary {
            time_on_page: time_on_page(self.started_at, Instant::now()),
            max_scroll_depth: self.scroll.max_depth(),
            exit_delivered,
        }
    }
}
