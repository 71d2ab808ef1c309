//! Tracker configuration.
//!
//! Defaults reproduce the behaviour landing pages already rely on: events go
//! to `/api/tracking/event`, a heartbeat every 30 seconds, scroll bursts
//! coalesced over 100 ms and thresholds at 25/50/75/100 percent.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while validating a [`TrackerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Tracking endpoint, absolute or relative to the page URL.
    pub endpoint: String,
    pub heartbeat_interval_secs: u64,
    pub scroll_debounce_ms: u64,
    /// Scroll percentages reported at most once per page load, ascending.
    pub scroll_thresholds: Vec<u8>,
    /// Query parameter carrying the click identifier.
    pub click_id_param: String,
    /// Storage key the resolved click identifier is persisted under.
    pub storage_key: String,
    /// Marker attribute flagging call-to-action elements.
    pub cta_attribute: String,
    /// Marker attribute flagging tracked forms.
    pub form_attribute: String,
    /// Maximum number of characters kept from a CTA's visible text.
    pub cta_text_limit: usize,
    /// Link extensions reported as downloads (case-insensitive).
    pub download_extensions: Vec<String>,
    /// Hosts whose links count as messaging (WhatsApp) conversions.
    pub messaging_hosts: Vec<String>,
    /// How long page exit waits for ordinary deliveries still in flight.
    pub exit_drain_timeout_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            endpoint: clicktrail_sdk::ENDPOINT_PATH.to_string(),
            heartbeat_interval_secs: 30,
            scroll_debounce_ms: 100,
            scroll_thresholds: vec![25, 50, 75, 100],
            click_id_param: "click_id".to_string(),
            storage_key: "tracking_click_id".to_string(),
            cta_attribute: "data-tracking-cta".to_string(),
            form_attribute: "data-tracking-form".to_string(),
            cta_text_limit: 100,
            download_extensions: ["pdf", "doc", "docx", "zip", "rar"]
                .into_iter()
                .map(String::from)
                .collect(),
            messaging_hosts: vec!["wa.me".to_string(), "whatsapp.com".to_string()],
            exit_drain_timeout_ms: 2000,
        }
    }
}

impl TrackerConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }

    pub fn exit_drain_timeout(&self) -> Duration {
        Duration::from_millis(self.exit_drain_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "endpoint must not be empty".to_string(),
            ));
        }
        if self.heartbeat_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "heartbeat_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.scroll_thresholds.is_empty() {
            return Err(ConfigError::ValidationError(
                "scroll_thresholds must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .scroll_thresholds
            .iter()
            .find(|t| **t == 0 || **t > 100)
        {
            return Err(ConfigError::ValidationError(format!(
                "scroll threshold {bad} is outside 1..=100"
            )));
        }
        if self.scroll_thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::ValidationError(
                "scroll_thresholds must be strictly ascending".to_string(),
            ));
        }
        for (name, value) in [
            ("click_id_param", &self.click_id_param),
            ("storage_key", &self.storage_key),
            ("cta_attribute", &self.cta_attribute),
            ("form_attribute", &self.form_attribute),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must not be empty"
                )));
            }
        }
        Ok(())
    }
}
