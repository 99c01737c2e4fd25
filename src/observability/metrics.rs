//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by handler, method, grouped status
//! - `http_request_duration_seconds` (histogram): latency by handler, method
//! - `http_request_duration_highr_seconds` (histogram): latency, fine buckets
//! - `http_request_size_bytes` / `http_response_size_bytes` (summary): by handler
//! - `service_info` (gauge): constant 1, labelled with the crate version
//!
//! `handler` is the matched route template, or `none` for unmatched paths.

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use axum::body::HttpBody;
use axum::extract::{MatchedPath, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const REQUEST_DURATION_HIGHR: &str = "http_request_duration_highr_seconds";
pub const REQUEST_SIZE: &str = "http_request_size_bytes";
pub const RESPONSE_SIZE: &str = "http_response_size_bytes";
pub const SERVICE_INFO: &str = "service_info";

/// Prometheus text exposition content type.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Label used when no route matched.
pub const UNMATCHED_HANDLER: &str = "none";

const LOWR_BUCKETS: &[f64] = &[0.1, 0.5, 1.0];
const HIGHR_BUCKETS: &[f64] = &[
    0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0,
    7.5, 10.0, 30.0, 60.0,
];

static HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Install the global Prometheus recorder.
///
/// A process can only have one global recorder; later calls return the
/// handle from the first.
pub fn install() -> Result<PrometheusHandle, BuildError> {
    let mut slot = HANDLE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), LOWR_BUCKETS)?
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION_HIGHR.to_string()), HIGHR_BUCKETS)?
        .install_recorder()?;

    describe();
    metrics::gauge!(SERVICE_INFO, "version" => env!("CARGO_PKG_VERSION")).set(1.0);

    tracing::debug!("Prometheus recorder installed");
    *slot = Some(handle.clone());
    Ok(handle)
}

fn describe() {
    metrics::describe_counter!(
        REQUESTS_TOTAL,
        "Total number of requests by method, status and handler."
    );
    metrics::describe_histogram!(
        REQUEST_DURATION,
        metrics::Unit::Seconds,
        "Latency with only few buckets by handler."
    );
    metrics::describe_histogram!(
        REQUEST_DURATION_HIGHR,
        metrics::Unit::Seconds,
        "Latency with many buckets but no API specific labels."
    );
    metrics::describe_histogram!(
        REQUEST_SIZE,
        metrics::Unit::Bytes,
        "Content length of incoming requests by handler."
    );
    metrics::describe_histogram!(
        RESPONSE_SIZE,
        metrics::Unit::Bytes,
        "Content length of outgoing responses by handler."
    );
    metrics::describe_gauge!(SERVICE_INFO, "Build information, constant 1.");
    metrics::describe_counter!(
        crate::observability::forward::DROPPED_TOTAL,
        "Log records dropped because the forwarding queue was full."
    );
    metrics::describe_counter!(
        crate::observability::forward::RECONNECTS_TOTAL,
        "Reconnects to the log collector."
    );
}

/// Router serving the scrape endpoint at `path`.
pub fn router(path: &str, handle: PrometheusHandle) -> Router {
    Router::new().route(path, get(scrape)).with_state(handle)
}

async fn scrape(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], handle.render())
}

/// Middleware recording request metrics. Apply with `route_layer` so the
/// matched route is known.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let handler = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_HANDLER.to_owned());
    instrument(handler, request, next).await
}

/// Middleware for the fallback handler: records under `none`.
pub async fn track_unmatched(request: Request, next: Next) -> Response {
    instrument(UNMATCHED_HANDLER.to_owned(), request, next).await
}

async fn instrument(handler: String, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().as_str().to_owned();
    let request_size = content_length(request.headers()).unwrap_or(0);

    let response = next.run(request).await;

    let elapsed = start.elapsed().as_secs_f64();
    let response_size = content_length(response.headers())
        .or_else(|| response.body().size_hint().exact())
        .unwrap_or(0);

    metrics::counter!(
        REQUESTS_TOTAL,
        "handler" => handler.clone(),
        "method" => method.clone(),
        "status" => status_group(response.status())
    )
    .increment(1);
    metrics::histogram!(REQUEST_DURATION, "handler" => handler.clone(), "method" => method)
        .record(elapsed);
    metrics::histogram!(REQUEST_DURATION_HIGHR).record(elapsed);
    metrics::histogram!(REQUEST_SIZE, "handler" => handler.clone()).record(request_size as f64);
    metrics::histogram!(RESPONSE_SIZE, "handler" => handler).record(response_size as f64);

    response
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// `200` → `2xx`, `404` → `4xx`.
pub fn status_group(status: StatusCode) -> String {
    format!("{}xx", status.as_u16() / 100)
}
