//! Tracking API handlers.
//!
//! # Endpoints
//!
//! - `POST /api/tracking/event`  – ingest one event from a tracker
//! - `GET  /api/tracking/events` – list stored events, optionally per click

mod tracking;

use axum::{
    Router,
    routing::{get, post},
};
use clicktrail_sdk::ENDPOINT_PATH;

use crate::state::AppState;

/// Path listing stored events.
pub const EVENTS_PATH: &str = "/api/tracking/events";

/// Build the tracking API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(ENDPOINT_PATH, post(tracking::ingest_event))
        .route(EVENTS_PATH, get(tracking::list_events))
}
