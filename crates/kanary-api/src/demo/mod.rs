//! Synthetic demo endpoints driving rollout and autoscaling exercises.
//!
//! Each endpoint validates its query parameter against declared bounds and
//! rejects out-of-range values with 400 before any handler effect runs: no
//! sleep, no spin, no allocation, no business-operation counters.

use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::Json;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};

use kanary_core::ApiError;

use crate::app_state::AppState;
use crate::error::Rejection;

const MAX_DELAY_SECS: u64 = 30;
const MIN_CPU_SECS: u64 = 1;
const MAX_CPU_SECS: u64 = 10;
const MIN_ALLOC_MB: usize = 1;
const MAX_ALLOC_MB: usize = 100;

#[derive(Debug, Deserialize)]
pub struct SlowParams {
    delay: Option<u64>,
}

/// Simulate a slow endpoint for testing timeouts and performance.
pub async fn slow(
    State(state): State<AppState>,
    Query(params): Query<SlowParams>,
) -> Result<Json<Value>, Rejection> {
    let settings = state.settings();

    // Parameter bounds are checked before the feature toggle.
    let delay = match params.delay {
        Some(d) if d > MAX_DELAY_SECS => {
            return Err(ApiError::Validation(format!(
                "delay must be between 0 and {MAX_DELAY_SECS}"
            ))
            .into());
        }
        Some(d) => d,
        None => settings.slow_endpoint_delay,
    };

    if !settings.enable_slow_endpoint {
        return Err(ApiError::FeatureDisabled("Slow endpoint is disabled".into()).into());
    }

    state.metrics().track_operation("slow_request", "started");
    tokio::time::sleep(Duration::from_secs(delay)).await;
    state.metrics().track_operation("slow_request", "completed");

    Ok(Json(json!({
        "message": format!("Response after {delay} seconds"),
        "delay": delay,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ErrorParams {
    rate: Option<f64>,
}

/// Fail a configurable percentage of requests with a simulated 500.
pub async fn error(
    State(state): State<AppState>,
    Query(params): Query<ErrorParams>,
) -> Result<Json<Value>, Rejection> {
    let rate = match params.rate {
        Some(r) if !r.is_finite() || !(0.0..=100.0).contains(&r) => {
            return Err(ApiError::Validation("rate must be between 0 and 100".into()).into());
        }
        Some(r) => r,
        None => state.settings().error_rate,
    };

    // thread_rng yields [0, 1), so rate=100 always fails and rate=0 never does.
    let roll = rand::thread_rng().gen::<f64>() * 100.0;
    if roll < rate {
        state.metrics().track_error("simulated_error");
        return Err(ApiError::Simulated(format!("Simulated error (rate: {rate}%)")).into());
    }

    Ok(Json(json!({
        "message": "Success",
        "error_rate": rate,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CpuParams {
    duration: Option<u64>,
}

/// Burn CPU for the requested duration, on the blocking pool so other
/// requests keep making progress.
pub async fn cpu(Query(params): Query<CpuParams>) -> Result<Json<Value>, Rejection> {
    let duration = params.duration.unwrap_or(MIN_CPU_SECS);
    if !(MIN_CPU_SECS..=MAX_CPU_SECS).contains(&duration) {
        return Err(ApiError::Validation(format!(
            "duration must be between {MIN_CPU_SECS} and {MAX_CPU_SECS}"
        ))
        .into());
    }

    let target = Duration::from_secs(duration);
    tokio::task::spawn_blocking(move || {
        let start = Instant::now();
        while start.elapsed() < target {
            std::hint::black_box((0..100_000u64).map(|i| i.wrapping_mul(i)).sum::<u64>());
        }
    })
    .await
    .map_err(|e| Rejection(ApiError::Internal(format!("cpu task failed: {e}"))))?;

    Ok(Json(json!({
        "message": "CPU intensive operation completed",
        "duration": duration,
    })))
}

#[derive(Debug, Deserialize)]
pub struct MemoryParams {
    size_mb: Option<usize>,
}

/// Allocate and touch a buffer to exercise memory limits.
pub async fn memory(Query(params): Query<MemoryParams>) -> Result<Json<Value>, Rejection> {
    let size_mb = params.size_mb.unwrap_or(10);
    if !(MIN_ALLOC_MB..=MAX_ALLOC_MB).contains(&size_mb) {
        return Err(ApiError::Validation(format!(
            "size_mb must be between {MIN_ALLOC_MB} and {MAX_ALLOC_MB}"
        ))
        .into());
    }

    let mut data = vec![0u8; size_mb * 1024 * 1024];
    // Touch both ends so the allocation is not optimized away.
    data[0] = 1;
    if let Some(last) = data.last_mut() {
        *last = 1;
    }
    std::hint::black_box(&data);

    Ok(Json(json!({
        "message": format!("Allocated {size_mb}MB of memory"),
        "size_mb": size_mb,
    })))
}
