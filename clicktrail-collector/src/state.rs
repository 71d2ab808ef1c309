//! Application state shared across all request handlers.

use crate::event_log::EventLog;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Received tracking events. Capacity can be changed via SIGHUP.
    pub events: Arc<EventLog>,
}

impl AppState {
    /// Create a new AppState with an event log of the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Arc::new(EventLog::new(capacity)),
        }
    }
}
