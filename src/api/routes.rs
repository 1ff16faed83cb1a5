use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::{api_key_auth, AppState};
use crate::triggers::publish_event;

use super::health::health;
use super::metrics::prometheus_metrics;
use super::recipients::list_recipients;

pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest(
            "/api/v1",
            Router::new()
                .route("/events", post(publish_event))
                .route("/recipients", get(list_recipients))
                .route_layer(middleware::from_fn_with_state(state, api_key_auth)),
        )
}
