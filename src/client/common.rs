//! Common helpers shared by the façade and the clients
//!
//! Span bookkeeping and metrics recording for a single Secret Manager call.

use super::Operation;
use crate::error::Error;
use crate::observability::metrics;
use std::time::{Duration, Instant};
use tracing::Span;

/// Records operation metrics and span attributes for a successful operation
pub fn record_success_metrics(span: &Span, operation: Operation, duration: Duration) {
    span.record("operation.duration_ms", duration.as_millis() as u64);
    span.record("operation.success", true);
    metrics::record_operation(operation.as_str(), duration.as_secs_f64());
}

/// Records operation metrics and span attributes for a failed operation
pub fn record_error_metrics(span: &Span, operation: Operation, error: &Error, duration: Duration) {
    let code = error.code().map_or("NONE", |code| code.as_str());
    span.record("operation.success", false);
    span.record("error.code", code);
    span.record("error.message", error.to_string());
    span.record("operation.duration_ms", duration.as_millis() as u64);
    metrics::record_operation(operation.as_str(), duration.as_secs_f64());
    metrics::increment_operation_errors(operation.as_str(), code);
}

/// Helper struct for tracking operation state
#[derive(Debug)]
pub struct OperationTracker {
    operation: Operation,
    start: Instant,
    span: Span,
}

impl OperationTracker {
    pub fn new(operation: Operation, span: Span) -> Self {
        Self {
            operation,
            start: Instant::now(),
            span,
        }
    }

    /// Record the outcome of `result` and hand it back unchanged
    pub fn finish<T>(&self, result: Result<T, Error>) -> Result<T, Error> {
        match &result {
            Ok(_) => record_success_metrics(&self.span, self.operation, self.start.elapsed()),
            Err(e) => record_error_metrics(&self.span, self.operation, e, self.start.elapsed()),
        }
        result
    }
}
