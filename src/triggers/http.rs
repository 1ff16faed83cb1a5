use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::server::AppState;

/// Event raised by the host over HTTP
#[derive(Debug, Deserialize)]
pub struct EventRequest {
    /// Event type, e.g. `common:form:create`
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct EventAccepted {
    pub event: String,
    /// Handlers the event was handed to
    pub handlers: usize,
    pub accepted_at: DateTime<Utc>,
}

/// POST /api/v1/events
///
/// Delivery runs in the background; the caller only learns how many handlers
/// will see the event.
#[tracing::instrument(name = "http.publish_event", skip(state, request), fields(event = %request.event))]
pub async fn publish_event(
    State(state): State<AppState>,
    Json(request): Json<EventRequest>,
) -> Result<(StatusCode, Json<EventAccepted>)> {
    let event = request.event.trim().to_string();
    if event.is_empty() {
        return Err(AppError::Validation("event must not be empty".to_string()));
    }

    let handlers = state.bus.handler_count(&event);
    if handlers == 0 {
        tracing::debug!("Event has no handlers");
    } else {
        let bus = state.bus.clone();
        let spawned_event = event.clone();
        tokio::spawn(async move {
            bus.publish(&spawned_event, request.payload).await;
        });
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(EventAccepted {
            event,
            handlers,
            accepted_at: Utc::now(),
        }),
    ))
}
