//! Prometheus metrics for request tracking and monitoring.
//!
//! This module provides metrics for:
//! - HTTP request counts and latency per route
//! - Service-layer failures per operation
//! - Issue and comment creation
//! - Authentication and authorization rejections

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Service call latency metric name.
pub const METRIC_SERVICE_LATENCY: &str = "service_call_latency_ms";
/// Service failures counter metric name.
pub const METRIC_SERVICE_FAILURES: &str = "service_failures_total";
/// Issues created counter metric name.
pub const METRIC_ISSUES_CREATED: &str = "issues_created_total";
/// Comments added counter metric name.
pub const METRIC_COMMENTS_ADDED: &str = "comments_added_total";
/// Auth rejections counter metric name.
pub const METRIC_AUTH_REJECTIONS: &str = "auth_rejections_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests handled");
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_histogram!(
        METRIC_SERVICE_LATENCY,
        "Service-layer call latency in milliseconds"
    );
    describe_counter!(
        METRIC_SERVICE_FAILURES,
        "Total number of failed service-layer calls"
    );
    describe_counter!(METRIC_ISSUES_CREATED, "Total number of issues created");
    describe_counter!(METRIC_COMMENTS_ADDED, "Total number of comments added");
    describe_counter!(
        METRIC_AUTH_REJECTIONS,
        "Total number of requests rejected by authentication or role checks"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Record a finished HTTP request.
pub fn record_http_request(start: Instant, method: &str, route: &str, status: u16) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    counter!(
        METRIC_HTTP_REQUESTS,
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "route" => route.to_string()).record(latency_ms);
}

/// Increment service failures counter.
pub fn inc_service_failures(operation: &'static str) {
    counter!(METRIC_SERVICE_FAILURES, "operation" => operation).increment(1);
}

/// Increment issues created counter.
pub fn inc_issues_created() {
    counter!(METRIC_ISSUES_CREATED).increment(1);
}

/// Increment comments added counter.
pub fn inc_comments_added() {
    counter!(METRIC_COMMENTS_ADDED).increment(1);
}

/// Increment auth rejections counter.
pub fn inc_auth_rejections(reason: &'static str) {
    counter!(METRIC_AUTH_REJECTIONS, "reason" => reason).increment(1);
}

/// Middleware recording count and latency of every request.
///
/// Labels by the matched route template so path ids don't explode cardinality.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;
    record_http_request(start, &method, &route, response.status().as_u16());
    response
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name).record(latency_ms);
    }
}

/// Create a latency timer for a service-layer call.
pub fn timer_service_call() -> LatencyTimer {
    LatencyTimer::new(METRIC_SERVICE_LATENCY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn latency_timer_measures_time() {
        let timer = LatencyTimer::new("test_metric");
        sleep(Duration::from_millis(10));
        let elapsed = timer.elapsed_ms();
        assert!(elapsed >= 9.0); // Allow some tolerance
    }

    #[test]
    fn recording_without_recorder_is_harmless() {
        record_http_request(Instant::now(), "GET", "/api/issues", 200);
        inc_service_failures("get_issues");
        inc_auth_rejections("missing_token");
    }
}
