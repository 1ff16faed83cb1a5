//! Prometheus metrics for the dispatch pipeline.
//!
//! - Dispatch metrics (events handled, skipped)
//! - Delivery metrics (messages sent / failed, recipients discovered)
//! - Telegram API metrics (requests by outcome, latency)
//! - Parameter store errors

mod helpers;

pub use helpers::{encode_metrics, DispatchMetrics, ParameterMetrics, TelegramMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "f2t";

lazy_static! {
    /// Events that reached a handler, by event kind
    pub static ref DISPATCHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_dispatches_total", METRIC_PREFIX),
        "Total events handed to the dispatch pipeline",
        &["event"]
    ).unwrap();

    /// Dispatches that sent nothing, by reason
    pub static ref DISPATCHES_SKIPPED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_dispatches_skipped_total", METRIC_PREFIX),
        "Total dispatches skipped before sending",
        &["reason"]
    ).unwrap();

    pub static ref MESSAGES_SENT_TOTAL: IntCounter = register_int_counter!(
        format!("{}_messages_sent_total", METRIC_PREFIX),
        "Total messages accepted by the Telegram API"
    ).unwrap();

    pub static ref MESSAGES_FAILED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_messages_failed_total", METRIC_PREFIX),
        "Total messages that could not be delivered"
    ).unwrap();

    pub static ref RECIPIENTS_DISCOVERED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_recipients_discovered_total", METRIC_PREFIX),
        "Total new chat ids discovered through getUpdates"
    ).unwrap();

    /// Telegram API calls, by endpoint and outcome (ok, api_error, http_error, transport, decode)
    pub static ref TELEGRAM_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_telegram_requests_total", METRIC_PREFIX),
        "Total Telegram Bot API requests",
        &["endpoint", "outcome"]
    ).unwrap();

    pub static ref TELEGRAM_REQUEST_SECONDS: HistogramVec = register_histogram_vec!(
        format!("{}_telegram_request_seconds", METRIC_PREFIX),
        "Telegram Bot API request latency in seconds",
        &["endpoint"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    pub static ref PARAMETER_STORE_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_parameter_store_errors_total", METRIC_PREFIX),
        "Total parameter store failures",
        &["op"]
    ).unwrap();
}
