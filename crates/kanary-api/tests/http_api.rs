#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

//! End-to-end tests against a live server on an ephemeral port, speaking raw
//! HTTP/1.1 so no client stack sits between the test and the wire.

use std::net::SocketAddr;
use std::time::Instant;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use kanary_api::app_state::AppState;
use kanary_api::config::Settings;
use kanary_api::probes::{DiskSample, FixedSampler, MemorySample};
use kanary_api::router::build_router;

const GIB: u64 = 1 << 30;

fn healthy_sampler() -> FixedSampler {
    FixedSampler {
        memory: Some(MemorySample {
            total: 16 * GIB,
            available: 12 * GIB,
        }),
        disk: Some(DiskSample {
            total: 100 * GIB,
            free: 60 * GIB,
        }),
    }
}

fn settings(vars: &[(&str, &str)]) -> Settings {
    let map: std::collections::HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::from_lookup(|key| map.get(key).cloned()).expect("test settings must be valid")
}

async fn spawn_app(settings: Settings, sampler: FixedSampler) -> SocketAddr {
    let state = AppState::with_sampler(settings, Box::new(sampler));
    let app = build_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// GET `path`, return (status, body). `Connection: close` lets us read to EOF.
async fn get(addr: SocketAddr, path: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8_lossy(&raw).to_string();

    let status = text
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("malformed response: {text}"));
    let body = text
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_string())
        .unwrap_or_default();
    (status, body)
}

fn parse_json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("invalid json ({e}): {body}"))
}

#[tokio::test]
async fn liveness_and_startup_always_ok() {
    let addr = spawn_app(settings(&[]), healthy_sampler()).await;

    for path in ["/health/live", "/health/startup"] {
        let (status, body) = get(addr, path).await;
        assert_eq!(status, 200, "{path}");
        let json = parse_json(&body);
        assert_eq!(json["status"], "ok");
        assert!(json["timestamp"].is_string());
        assert!(json["version"].is_string());
    }
}

#[tokio::test]
async fn readiness_reports_all_three_checks() {
    let addr = spawn_app(settings(&[]), healthy_sampler()).await;

    let (status, body) = get(addr, "/health/ready").await;
    assert_eq!(status, 200);
    let json = parse_json(&body);
    assert_eq!(json["status"], "ok");
    let checks = json["checks"].as_object().unwrap();
    assert_eq!(checks.len(), 3);
    assert!(checks["memory"]["healthy"].as_bool().unwrap());
    assert!(checks["disk"]["healthy"].as_bool().unwrap());
    assert_eq!(checks["config"]["message"], "Configuration OK");
}

#[tokio::test]
async fn readiness_fails_on_memory_pressure() {
    let sampler = FixedSampler {
        memory: Some(MemorySample {
            total: 10 * GIB,
            available: GIB / 2, // 95% used
        }),
        ..healthy_sampler()
    };
    let addr = spawn_app(settings(&[]), sampler).await;

    let (status, body) = get(addr, "/health/ready").await;
    assert_eq!(status, 503);
    let json = parse_json(&body);
    assert_eq!(json["status"], "error");
    assert!(!json["checks"]["memory"]["healthy"].as_bool().unwrap());
    assert!(json["checks"]["disk"]["healthy"].as_bool().unwrap());
}

#[tokio::test]
async fn version_exposes_build_identity() {
    let vars = [
        ("VERSION", "0.2.1"),
        ("BUILD_NUMBER", "7"),
        ("GIT_COMMIT", "deadbeef"),
        ("GIT_BRANCH", "main"),
        ("APP_ENV", "staging"),
    ];
    let addr = spawn_app(settings(&vars), healthy_sampler()).await;

    let (status, body) = get(addr, "/api/version").await;
    assert_eq!(status, 200);
    let json = parse_json(&body);
    assert_eq!(json["version"], "0.2.1");
    assert_eq!(json["build_number"], "7");
    assert_eq!(json["git_commit"], "deadbeef");
    assert_eq!(json["git_branch"], "main");
    assert_eq!(json["environment"], "staging");
}

#[tokio::test]
async fn info_reports_features_and_links() {
    let addr = spawn_app(settings(&[("APP_NAME", "canary-demo")]), healthy_sampler()).await;

    let (status, body) = get(addr, "/api/info").await;
    assert_eq!(status, 200);
    let json = parse_json(&body);
    assert_eq!(json["name"], "canary-demo");
    assert_eq!(json["environment"], "development");
    assert!(json["uptime_seconds"].is_u64());
    assert_eq!(json["features"]["slow_endpoint"], true);
    assert_eq!(json["links"]["metrics"], "/metrics");
}

#[tokio::test]
async fn changelog_matches_running_version() {
    let addr = spawn_app(settings(&[("VERSION", "0.2.1")]), healthy_sampler()).await;

    let (status, body) = get(addr, "/api/changelog").await;
    assert_eq!(status, 200);
    let json = parse_json(&body);
    assert_eq!(json["version"], "0.2.1");
    assert_eq!(json["changes"], "Canary test bump");
}

#[tokio::test]
async fn metrics_expose_request_counters() {
    let addr = spawn_app(settings(&[("VERSION", "0.2.1")]), healthy_sampler()).await;

    get(addr, "/health/live").await;
    get(addr, "/health/live").await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8_lossy(&raw);

    assert!(text.contains("content-type: text/plain; version=0.0.4; charset=utf-8"));
    assert!(text.contains(
        "http_requests_total{method=\"GET\",endpoint=\"/health/live\",status=\"200\"} 2"
    ));
    assert!(text.contains("http_request_duration_seconds_bucket"));
    assert!(text.contains("app_version_info{"));
    assert!(text.contains("version=\"0.2.1\""));
    // The in-flight scrape itself is the only active request.
    assert!(text.contains("http_requests_active 1"));
}

#[tokio::test]
async fn unmatched_paths_are_counted_under_unknown() {
    let addr = spawn_app(settings(&[]), healthy_sampler()).await;

    let (status, body) = get(addr, "/no/such/route").await;
    assert_eq!(status, 404);
    assert_eq!(parse_json(&body)["code"], "NOT_FOUND");

    let (_, metrics) = get(addr, "/metrics").await;
    assert!(metrics.contains(
        "http_requests_total{method=\"GET\",endpoint=\"unknown\",status=\"404\"} 1"
    ));
}

#[tokio::test]
async fn slow_endpoint_honors_delay_and_bounds() {
    let addr = spawn_app(settings(&[]), healthy_sampler()).await;

    let (status, body) = get(addr, "/demo/slow?delay=0").await;
    assert_eq!(status, 200);
    let json = parse_json(&body);
    assert_eq!(json["delay"], 0);
    assert_eq!(json["message"], "Response after 0 seconds");

    let (status, body) = get(addr, "/demo/slow?delay=31").await;
    assert_eq!(status, 400);
    assert_eq!(parse_json(&body)["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn slow_endpoint_actually_waits() {
    let addr = spawn_app(settings(&[]), healthy_sampler()).await;

    let start = Instant::now();
    let (status, _) = get(addr, "/demo/slow?delay=1").await;
    assert_eq!(status, 200);
    assert!(start.elapsed().as_millis() >= 1000);
}

#[tokio::test]
async fn slow_endpoint_can_be_disabled() {
    let addr = spawn_app(settings(&[("ENABLE_SLOW_ENDPOINT", "false")]), healthy_sampler()).await;

    let (status, body) = get(addr, "/demo/slow").await;
    assert_eq!(status, 404);
    let json = parse_json(&body);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["detail"], "Slow endpoint is disabled");

    // Bounds violations outrank the toggle, matching query-validation order.
    let (status, body) = get(addr, "/demo/slow?delay=31").await;
    assert_eq!(status, 400);
    assert_eq!(parse_json(&body)["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn error_endpoint_rate_zero_never_fails() {
    let addr = spawn_app(settings(&[]), healthy_sampler()).await;

    for _ in 0..20 {
        let (status, body) = get(addr, "/demo/error?rate=0").await;
        assert_eq!(status, 200);
        assert_eq!(parse_json(&body)["message"], "Success");
    }
}

#[tokio::test]
async fn error_endpoint_rate_hundred_always_fails() {
    let addr = spawn_app(settings(&[]), healthy_sampler()).await;

    for _ in 0..5 {
        let (status, body) = get(addr, "/demo/error?rate=100").await;
        assert_eq!(status, 500);
        assert_eq!(parse_json(&body)["code"], "SIMULATED");
    }

    let (_, metrics) = get(addr, "/metrics").await;
    assert!(metrics.contains("app_errors_total{error_type=\"simulated_error\"} 5"));
}

#[tokio::test]
async fn error_endpoint_rejects_out_of_range_rate() {
    let addr = spawn_app(settings(&[]), healthy_sampler()).await;

    for bad in ["/demo/error?rate=-1", "/demo/error?rate=100.5"] {
        let (status, body) = get(addr, bad).await;
        assert_eq!(status, 400, "{bad}");
        assert_eq!(parse_json(&body)["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn cpu_endpoint_rejects_out_of_range_duration() {
    let addr = spawn_app(settings(&[]), healthy_sampler()).await;

    for bad in ["/demo/cpu?duration=0", "/demo/cpu?duration=999"] {
        let (status, _) = get(addr, bad).await;
        assert_eq!(status, 400, "{bad}");
    }
}

#[tokio::test]
async fn memory_endpoint_allocates_and_reports() {
    let addr = spawn_app(settings(&[]), healthy_sampler()).await;

    let (status, body) = get(addr, "/demo/memory?size_mb=5").await;
    assert_eq!(status, 200);
    let json = parse_json(&body);
    assert_eq!(json["size_mb"], 5);
    assert_eq!(json["message"], "Allocated 5MB of memory");

    let (status, _) = get(addr, "/demo/memory?size_mb=101").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn active_gauge_returns_to_zero_after_errors() {
    let addr = spawn_app(settings(&[]), healthy_sampler()).await;

    get(addr, "/demo/error?rate=100").await;
    get(addr, "/no/such/route").await;

    // Only the scrape itself should be in flight.
    let (_, metrics) = get(addr, "/metrics").await;
    assert!(metrics.contains("http_requests_active 1"));
    assert!(!metrics.contains("http_requests_active 2"));
    assert!(!metrics.contains("http_requests_active 3"));
}

#[tokio::test]
async fn business_operations_track_slow_requests() {
    let addr = spawn_app(settings(&[]), healthy_sampler()).await;

    get(addr, "/demo/slow?delay=0").await;
    get(addr, "/demo/slow?delay=0").await;

    let (_, metrics) = get(addr, "/metrics").await;
    assert!(metrics.contains(
        "business_operations_total{operation=\"slow_request\",status=\"started\"} 2"
    ));
    assert!(metrics.contains(
        "business_operations_total{operation=\"slow_request\",status=\"completed\"} 2"
    ));
}
