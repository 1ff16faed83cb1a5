//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::events::{FORM_SUBMITTED, ORDER_CREATED};
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub parameters: ParametersHealthResponse,
    pub handlers: HandlersHealthResponse,
}

#[derive(Debug, Serialize)]
pub struct ParametersHealthResponse {
    pub backend: String,
    pub reachable: bool,
    /// Whether a bot token is configured
    pub delivery_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct HandlersHealthResponse {
    pub order_created: usize,
    pub form_submitted: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let keys = state.notifier.keys();
    let (reachable, delivery_enabled) = match state.parameters.get(&keys.token).await {
        Ok(token) => (true, token.is_some_and(|t| !t.trim().is_empty())),
        Err(e) => {
            tracing::warn!(error = %e, "Parameter store health check failed");
            (false, false)
        }
    };

    let status = if reachable { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        parameters: ParametersHealthResponse {
            backend: state.parameters.backend_name().to_string(),
            reachable,
            delivery_enabled,
        },
        handlers: HandlersHealthResponse {
            order_created: state.bus.handler_count(ORDER_CREATED),
            form_submitted: state.bus.handler_count(FORM_SUBMITTED),
        },
    })
}
