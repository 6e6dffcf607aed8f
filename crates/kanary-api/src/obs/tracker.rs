//! Request-tracking middleware.
//!
//! Observes every request/response pair exactly once:
//! - active-request gauge is held by a drop guard, so the decrement survives
//!   handler panics and upstream cancellation
//! - the endpoint label is the matched route *template* (`/demo/slow`, never
//!   the raw path), or the sentinel `"unknown"` when nothing matched, which
//!   keeps label cardinality bounded by the route table

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use kanary_core::MetricsRegistry;

use crate::app_state::AppState;

/// Endpoint label used when no route matched.
pub const UNMATCHED_ENDPOINT: &str = "unknown";

struct ActiveRequestGuard {
    metrics: Arc<MetricsRegistry>,
}

impl ActiveRequestGuard {
    fn enter(metrics: Arc<MetricsRegistry>) -> Self {
        metrics.active_requests.inc();
        Self { metrics }
    }
}

impl Drop for ActiveRequestGuard {
    fn drop(&mut self) {
        self.metrics.active_requests.dec();
    }
}

/// Declared body size from the content-length header; 0 when absent or
/// unparseable.
fn declared_size(headers: &HeaderMap) -> u64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

pub async fn track_requests(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let metrics = state.metrics_handle();
    let _active = ActiveRequestGuard::enter(Arc::clone(&metrics));

    let start = Instant::now();
    let method = req.method().as_str().to_string();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ENDPOINT.to_string());
    let request_size = declared_size(req.headers());

    let response = next.run(req).await;

    let duration = start.elapsed();
    let response_size = declared_size(response.headers());
    metrics.track_request(
        &method,
        &endpoint,
        response.status().as_u16(),
        duration,
        request_size,
        response_size,
    );

    response
}
