//! Operational HTTP endpoints.
//!
//! - `/health/live`    : liveness, always 200
//! - `/health/ready`   : readiness, 200 or 503 from the three checks
//! - `/health/startup` : startup probe, always 200
//! - `/api/version`    : build identity
//! - `/api/info`       : name, version, uptime, feature flags, links
//! - `/api/changelog`  : notes for the running version
//! - `/metrics`        : Prometheus text format

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use kanary_core::health::{ProbeResponse, ReadinessResponse};
use kanary_core::ApiError;

use crate::app_state::AppState;
use crate::error::Rejection;
use crate::probes;

const CHANGELOG: &[(&str, &str)] = &[
    ("0.1.0", "Initial version"),
    ("0.2.0", "Visible bump for rollout tests"),
    ("0.2.1", "Canary test bump"),
];

/// Liveness: only asserts the process responds. Resource pressure must never
/// fail this probe, or Kubernetes would restart a healthy-but-busy pod.
pub async fn live(State(state): State<AppState>) -> Json<ProbeResponse> {
    Json(ProbeResponse::alive(state.version().version.clone()))
}

/// Startup probe for slow-starting containers; same contract as liveness.
pub async fn startup(State(state): State<AppState>) -> Json<ProbeResponse> {
    Json(ProbeResponse::alive(state.version().version.clone()))
}

/// Readiness: evaluates memory, disk, and configuration fresh on every call.
pub async fn ready(State(state): State<AppState>) -> Response {
    let checks = probes::run_checks(state.settings(), state.version(), state.sampler());
    let body = ReadinessResponse::new(state.version().version.clone(), checks);
    let status = if body.is_ready() {
        StatusCode::OK
    } else {
        let failing: Vec<&str> = body
            .checks
            .iter()
            .filter(|(_, c)| !c.healthy)
            .map(|(name, _)| name.as_str())
            .collect();
        tracing::warn!(?failing, "readiness checks failing");
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body)).into_response()
}

pub async fn version(State(state): State<AppState>) -> Json<kanary_core::VersionInfo> {
    Json(state.version().clone())
}

pub async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let settings = state.settings();
    Json(json!({
        "name": settings.app_name,
        "version": state.version().version,
        "environment": settings.app_env,
        "uptime_seconds": state.uptime().as_secs(),
        "features": {
            "slow_endpoint": settings.enable_slow_endpoint,
            "metrics": true,
            "health_checks": true,
        },
        "links": {
            "health": "/health/ready",
            "metrics": settings.metrics_path,
            "version": "/api/version",
        },
    }))
}

pub async fn changelog(State(state): State<AppState>) -> Json<serde_json::Value> {
    let current = state.version().version.as_str();
    let changes = CHANGELOG
        .iter()
        .find(|(v, _)| *v == current)
        .map(|(_, notes)| *notes)
        .unwrap_or("unknown");
    Json(json!({ "version": current, "changes": changes }))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.metrics().render();
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
        .into_response()
}

/// Fallback for unmatched paths. The tracker counts these under the
/// `"unknown"` endpoint label.
pub async fn fallback() -> Rejection {
    Rejection(ApiError::NotFound)
}
