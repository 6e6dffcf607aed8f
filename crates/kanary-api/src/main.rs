//! kanary API binary.
//!
//! Demo HTTP service instrumented for Kubernetes-native observability:
//! liveness/readiness/startup probes, Prometheus metrics, version/info
//! endpoints, and synthetic demo endpoints for rollout and autoscaling
//! exercises.

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use kanary_api::{app_state, config, router};

#[tokio::main]
async fn main() {
    let settings = config::load_from_env().expect("settings load failed");

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone()));
    fmt().with_env_filter(filter).init();

    let listen = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let state = app_state::AppState::new(settings);

    tracing::info!(%listen, version = %state.version().version, "kanary-api starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    let app = router::build_router(state);
    axum::serve(listener, app).await.expect("server failed");
}
