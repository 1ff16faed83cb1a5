// Ambient
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Core
pub mod events;
pub mod parameters;
pub mod recipients;
pub mod render;
pub mod telegram;

// Ingress and HTTP surface
pub mod api;
pub mod server;
pub mod triggers;
