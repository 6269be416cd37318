//! # Metrics
//!
//! Prometheus metrics for Secret Manager operations.
//!
//! ## Metrics Exposed
//!
//! - `secret_manager_operations_total` - Total number of Secret Manager operations by operation
//! - `secret_manager_operation_duration_seconds` - Duration of Secret Manager operations by operation
//! - `secret_manager_operation_errors_total` - Total number of failed operations by operation and status code
//! - `secret_manager_already_exists_short_circuits_total` - Creates refused locally because the secret existed
//!
//! The metrics live in a crate-owned [`Registry`]. Call [`register_metrics`] once
//! at startup and expose [`registry`] through whatever endpoint the host
//! application serves.

use crate::constants::PROVIDER;
use anyhow::Result;
use prometheus::{HistogramVec, IntCounter, IntCounterVec, Registry};
use std::sync::LazyLock;

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_manager_operations_total",
            "Total number of Secret Manager operations by operation",
        ),
        &["provider", "operation"],
    )
    .expect("Failed to create OPERATIONS_TOTAL metric - this should never happen")
});

static OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "secret_manager_operation_duration_seconds",
            "Duration of Secret Manager operations in seconds by operation",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
        &["provider", "operation"],
    )
    .expect("Failed to create OPERATION_DURATION metric - this should never happen")
});

static OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_manager_operation_errors_total",
            "Total number of failed Secret Manager operations by operation and status code",
        ),
        &["provider", "operation", "code"],
    )
    .expect("Failed to create OPERATION_ERRORS_TOTAL metric - this should never happen")
});

static ALREADY_EXISTS_SHORT_CIRCUITS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "secret_manager_already_exists_short_circuits_total",
        "Total number of creates refused locally because the secret already existed",
    )
    .expect(
        "Failed to create ALREADY_EXISTS_SHORT_CIRCUITS_TOTAL metric - this should never happen",
    )
});

/// Register all metrics with the crate registry
///
/// # Errors
/// Returns an error if a metric is registered twice
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(OPERATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(OPERATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(ALREADY_EXISTS_SHORT_CIRCUITS_TOTAL.clone()))?;
    Ok(())
}

/// Registry holding this crate's metrics
pub fn registry() -> &'static Registry {
    &REGISTRY
}

pub fn record_operation(operation: &str, duration: f64) {
    OPERATIONS_TOTAL
        .with_label_values(&[PROVIDER, operation])
        .inc();
    OPERATION_DURATION
        .with_label_values(&[PROVIDER, operation])
        .observe(duration);
}

pub fn increment_operation_errors(operation: &str, code: &str) {
    OPERATION_ERRORS_TOTAL
        .with_label_values(&[PROVIDER, operation, code])
        .inc();
}

pub fn increment_already_exists_short_circuits() {
    ALREADY_EXISTS_SHORT_CIRCUITS_TOTAL.inc();
}
