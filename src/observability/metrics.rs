//! Metrics collection and exposition.
//!
//! # Metrics
//! - `datawatch_requests_total` (counter): requests by route, status
//! - `datawatch_request_duration_seconds` (histogram): latency by route
//! - `datawatch_rejections_total` (counter): gate rejections by route, reason
//! - `datawatch_upstream_requests_total` (counter): outbound calls by
//!   upstream, outcome

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

pub const REQUESTS_TOTAL: &str = "datawatch_requests_total";
pub const REQUEST_DURATION: &str = "datawatch_request_duration_seconds";
pub const REJECTIONS_TOTAL: &str = "datawatch_rejections_total";
pub const UPSTREAM_REQUESTS_TOTAL: &str = "datawatch_upstream_requests_total";

/// Start the Prometheus scrape listener and install it as the global recorder.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics listener started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics listener"),
    }
}

pub fn record_request(route: &str, status: u16, start: Instant) {
    counter!(REQUESTS_TOTAL, "route" => route.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!(REQUEST_DURATION, "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// A gate turned the request away before the handler ran.
pub fn record_rejection(route: &'static str, reason: &'static str) {
    counter!(REJECTIONS_TOTAL, "route" => route, "reason" => reason).increment(1);
}

pub fn record_upstream(upstream: &'static str, outcome: &'static str) {
    counter!(UPSTREAM_REQUESTS_TOTAL, "upstream" => upstream, "outcome" => outcome)
        .increment(1);
}

/// Per-request counter and latency, labelled by the matched route template.
pub async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_request(&route, response.status().as_u16(), start);
    response
}
