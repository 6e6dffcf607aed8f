//! Axum router wiring.
//!
//! The tracker is layered over the whole router, fallback included, so
//! unmatched requests are still counted (under the `"unknown"` endpoint
//! label). Route templates registered here are the same table `MatchedPath`
//! resolves against in the tracker.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, demo, obs, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(ops::live))
        .route("/health/ready", get(ops::ready))
        .route("/health/startup", get(ops::startup))
        .route("/api/version", get(ops::version))
        .route("/api/info", get(ops::info))
        .route("/api/changelog", get(ops::changelog))
        .route("/metrics", get(ops::metrics))
        .route("/demo/slow", get(demo::slow))
        .route("/demo/error", get(demo::error))
        .route("/demo/cpu", get(demo::cpu))
        .route("/demo/memory", get(demo::memory))
        .fallback(ops::fallback)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            obs::tracker::track_requests,
        ))
        .with_state(state)
}
