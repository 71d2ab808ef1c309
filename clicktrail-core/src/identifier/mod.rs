//! Click identifier resolution.
//!
//! The identifier links a landing page visit back to the tracked click that
//! produced it. It is resolved once per page load, in priority order, from:
//!
//! 1. a value preset by the host page before the tracker starts,
//! 2. the `click_id` query parameter of the page URL,
//! 3. a value persisted by an earlier page load.
//!
//! A resolved identifier is written back to storage right away so later
//! page loads without explicit context still attribute their events.

mod storage;

pub use storage::{ClickIdStorage, JsonFileStorage, MemoryStorage, StorageError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::TrackerConfig;

/// A positive click identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ClickId(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseClickIdError {
    #[error("click id is not an integer: {0:?}")]
    NotAnInteger(String),
    #[error("click id must be positive, got {0}")]
    NotPositive(i64),
}

impl ClickId {
    /// Returns `None` for zero or negative values.
    pub fn new(raw: i64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for ClickId {
    type Error = ParseClickIdError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or(ParseClickIdError::NotPositive(raw))
    }
}

impl From<ClickId> for i64 {
    fn from(id: ClickId) -> Self {
        id.0
    }
}

impl std::str::FromStr for ClickId {
    type Err = ParseClickIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let raw: i64 = trimmed
            .parse()
            .map_err(|_| ParseClickIdError::NotAnInteger(trimmed.to_string()))?;
        Self::try_from(raw)
    }
}

impl std::fmt::Display for ClickId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a click identifier was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickIdSource {
    Preset,
    Query,
    Storage,
}

impl std::fmt::Display for ClickIdSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClickIdSource::Preset => write!(f, "preset"),
            ClickIdSource::Query => write!(f, "query"),
            ClickIdSource::Storage => write!(f, "storage"),
        }
    }
}

/// What the host page tells the tracker about the current page view.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub url: Url,
    pub referrer: Option<String>,
    /// Identifier set by the host page before the tracker starts.
    pub preset_click_id: Option<i64>,
}

impl PageContext {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            referrer: None,
            preset_click_id: None,
        }
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        let referrer = referrer.into();
        self.referrer = (!referrer.is_empty()).then_some(referrer);
        self
    }

    pub fn with_preset_click_id(mut self, click_id: i64) -> Self {
        self.preset_click_id = Some(click_id);
        self
    }
}

/// Resolves and persists the click identifier for a page view.
#[derive(Debug, Clone)]
pub struct IdentifierResolver {
    query_param: String,
    storage_key: String,
}

impl IdentifierResolver {
    pub fn new(query_param: impl Into<String>, storage_key: impl Into<String>) -> Self {
        Self {
            query_param: query_param.into(),
            storage_key: storage_key.into(),
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(&config.click_id_param, &config.storage_key)
    }

    /// Look the identifier up without persisting it.
    ///
    /// Malformed candidates are skipped, so a garbage query parameter
    /// falls through to the stored value instead of disabling tracking.
    pub fn resolve(
        &self,
        page: &PageContext,
        storage: &dyn ClickIdStorage,
    ) -> Option<(ClickId, ClickIdSource)> {
        if let Some(raw) = page.preset_click_id {
            match ClickId::new(raw) {
                Some(id) => return Some((id, ClickIdSource::Preset)),
                None => debug!(raw, "Ignoring non-positive preset click id"),
            }
        }

        if let Some((_, value)) = page
            .url
            .query_pairs()
            .find(|(key, _)| *key == self.query_param)
        {
            match value.parse::<ClickId>() {
                Ok(id) => return Some((id, ClickIdSource::Query)),
                Err(e) => debug!(error = %e, "Ignoring malformed click id query parameter"),
            }
        }

        match storage.get(&self.storage_key) {
            Ok(Some(stored)) => match stored.parse::<ClickId>() {
                Ok(id) => return Some((id, ClickIdSource::Storage)),
                Err(e) => debug!(error = %e, "Ignoring malformed stored click id"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to read stored click id"),
        }

        None
    }

    /// Write `id` to storage under the configured key.
    pub fn persist(&self, id: ClickId, storage: &dyn ClickIdStorage) -> Result<(), StorageError> {
        storage.set(&self.storage_key, &id.to_string())
    }

    /// Resolve the identifier and persist it on success.
    ///
    /// A storage failure is logged and does not disable tracking.
    pub fn resolve_and_persist(
        &self,
        page: &PageContext,
        storage: &dyn ClickIdStorage,
    ) -> Option<ClickId> {
        let (id, source) = self.resolve(page, storage)?;
        info!(click_id = %id, %source, "Resolved click id");

        if let Err(e) = self.persist(id, storage) {
            warn!(click_id = %id, error = %e, "Failed to persist click id");
        }
        Some(id)
    }
}
