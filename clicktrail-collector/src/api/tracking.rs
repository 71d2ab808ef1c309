use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use bytes::Bytes;
use clicktrail_sdk::objects::TrackingPayload;
use kanau::processor::Processor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event_log::{IngestError, IngestEvent, ListEvents};
use crate::state::AppState;

/// Response for an accepted event.
#[derive(Debug, Serialize)]
pub(super) struct IngestResponse {
    id: Uuid,
}

/// `POST /api/tracking/event`: ingest one tracking event.
///
/// The body is read raw so that beacon deliveries sent as
/// `text/plain;charset=UTF-8` are accepted the same as `application/json`.
pub(super) async fn ingest_event(
    state: State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, TrackingApiError> {
    let payload: TrackingPayload =
        serde_json::from_slice(&body).map_err(TrackingApiError::MalformedBody)?;

    let stored = state
        .events
        .process(IngestEvent { payload })
        .await
        .map_err(TrackingApiError::Rejected)?;

    tracing::info!(
        id = %stored.id,
        click_id = stored.click_id,
        event_type = %stored.event_type,
        "Tracking event received"
    );

    Ok((StatusCode::CREATED, Json(IngestResponse { id: stored.id })))
}

#[derive(Debug, Deserialize)]
pub(super) struct ListEventsQuery {
    click_id: Option<i64>,
}

/// `GET /api/tracking/events`: list stored events, oldest first.
pub(super) async fn list_events(
    state: State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> impl IntoResponse {
    let events = match state
        .events
        .process(ListEvents {
            click_id: query.click_id,
        })
        .await
    {
        Ok(events) => events,
        Err(never) => match never {},
    };
    Json(events)
}

/// Errors that can occur in tracking API handlers.
#[derive(Debug)]
pub(super) enum TrackingApiError {
    /// The body is not a tracking payload.
    MalformedBody(serde_json::Error),
    /// The payload was rejected by the event log.
    Rejected(IngestError),
}

impl IntoResponse for TrackingApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            TrackingApiError::MalformedBody(e) => {
                tracing::debug!(error = %e, "Malformed tracking payload");
                (StatusCode::BAD_REQUEST, format!("malformed payload: {e}")).into_response()
            }
            TrackingApiError::Rejected(e) => {
                tracing::debug!(error = %e, "Rejected tracking payload");
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
        }
    }
}
