//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{
    DISPATCHES_SKIPPED_TOTAL, DISPATCHES_TOTAL, MESSAGES_FAILED_TOTAL, MESSAGES_SENT_TOTAL,
    PARAMETER_STORE_ERRORS_TOTAL, RECIPIENTS_DISCOVERED_TOTAL, TELEGRAM_REQUESTS_TOTAL,
    TELEGRAM_REQUEST_SECONDS,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

pub struct DispatchMetrics;

impl DispatchMetrics {
    pub fn record_dispatch(event: &str) {
        DISPATCHES_TOTAL.with_label_values(&[event]).inc();
    }

    pub fn record_skipped(reason: &str) {
        DISPATCHES_SKIPPED_TOTAL.with_label_values(&[reason]).inc();
    }

    pub fn record_sent() {
        MESSAGES_SENT_TOTAL.inc();
    }

    pub fn record_failed() {
        MESSAGES_FAILED_TOTAL.inc();
    }

    pub fn record_discovered(count: u64) {
        RECIPIENTS_DISCOVERED_TOTAL.inc_by(count);
    }
}

pub struct TelegramMetrics;

impl TelegramMetrics {
    pub fn record_request(endpoint: &str, outcome: &str, elapsed: Duration) {
        TELEGRAM_REQUESTS_TOTAL
            .with_label_values(&[endpoint, outcome])
            .inc();
        TELEGRAM_REQUEST_SECONDS
            .with_label_values(&[endpoint])
            .observe(elapsed.as_secs_f64());
    }
}

pub struct ParameterMetrics;

impl ParameterMetrics {
    pub fn record_error(op: &str) {
        PARAMETER_STORE_ERRORS_TOTAL.with_label_values(&[op]).inc();
    }
}
