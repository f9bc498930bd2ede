//! Prometheus metrics for the storage gateway
//!
//! Defines metrics for:
//! - Request counts by operation and envelope code
//! - Request latency
//! - Storage operation counts and duration

use lazy_static::lazy_static;
use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts, Registry};
use std::time::Instant;

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

lazy_static! {
    /// Registry for all metrics
    pub static ref REGISTRY: Registry = Registry::new();

    /// Gateway requests by operate value and envelope code
    pub static ref REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("gateway_requests_total", "Total gateway requests"),
        &["operate", "code"]
    )
    .expect("metric definition is valid");

    /// Gateway request latency histogram
    pub static ref REQUEST_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "gateway_request_duration_seconds",
            "Gateway request duration in seconds"
        )
        .buckets(LATENCY_BUCKETS.to_vec())
    )
    .expect("metric definition is valid");

    /// Storage operation counter by operation and status
    pub static ref STORAGE_OPERATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("gateway_storage_operations_total", "Total storage operations"),
        &["operation", "status"]
    )
    .expect("metric definition is valid");

    /// Storage operation duration histogram
    pub static ref STORAGE_OPERATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "gateway_storage_operation_duration_seconds",
            "Storage operation duration in seconds"
        )
        .buckets(LATENCY_BUCKETS.to_vec())
    )
    .expect("metric definition is valid");
}

/// Register every metric with the global registry
pub fn init_metrics() -> Result<(), prometheus::Error> {
    REGISTRY.register(Box::new(REQUESTS.clone()))?;
    REGISTRY.register(Box::new(REQUEST_DURATION.clone()))?;
    REGISTRY.register(Box::new(STORAGE_OPERATIONS.clone()))?;
    REGISTRY.register(Box::new(STORAGE_OPERATION_DURATION.clone()))?;
    Ok(())
}

/// Record one gateway request; `code` is `None` for empty replies
pub fn observe_request(operate: &str, code: Option<u16>, started: Instant) {
    let code = code.map_or_else(|| "none".to_string(), |c| c.to_string());
    REQUESTS.with_label_values(&[operate, &code]).inc();
    REQUEST_DURATION.observe(started.elapsed().as_secs_f64());
}

/// Record one storage operation
pub fn observe_storage(operation: &str, started: Instant, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    STORAGE_OPERATIONS
        .with_label_values(&[operation, status])
        .inc();
    STORAGE_OPERATION_DURATION.observe(started.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_counter_increments() {
        let before = STORAGE_OPERATIONS
            .with_label_values(&["mkdir", "error"])
            .get();
        observe_storage("mkdir", Instant::now(), false);
        let after = STORAGE_OPERATIONS
            .with_label_values(&["mkdir", "error"])
            .get();
        assert!(after > before);
    }
}
