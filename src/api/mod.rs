//! HTTP endpoints: health, metrics and the recipient listing.

mod health;
mod metrics;
mod recipients;
mod routes;

pub use health::{health, HealthResponse};
pub use metrics::prometheus_metrics;
pub use recipients::{list_recipients, RecipientsResponse};
pub use routes::api_routes;
