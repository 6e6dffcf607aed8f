//! Process-wide metrics registry with Prometheus text exposition.
//!
//! One registry instance is created at startup and shared by the request
//! tracker and every handler. Families and their label-name sets are fixed
//! here; series names are part of the dashboard/alert contract and must not
//! change. Every mutation is independently atomic and `render` may run
//! concurrently with mutation (per-series snapshot semantics).

mod series;

pub use series::{CounterVec, Gauge, HistogramVec, InfoRecord};

use std::time::Duration;

use crate::version::VersionInfo;

/// Duration buckets in seconds, covering the slow endpoint's 0..=30s range.
pub const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Payload-size buckets in bytes.
pub const SIZE_BUCKETS: &[f64] = &[
    64.0, 256.0, 1024.0, 4096.0, 16384.0, 65536.0, 262144.0, 1048576.0,
];

/// All counters, gauges, histograms, and info records owned by the process.
pub struct MetricsRegistry {
    /// Per-request counter labeled by method, route template, status code.
    pub request_count: CounterVec,
    /// Request wall-clock duration in seconds.
    pub request_duration: HistogramVec,
    /// Declared request body size in bytes.
    pub request_size: HistogramVec,
    /// Declared response body size in bytes.
    pub response_size: HistogramVec,
    /// Application-level errors by fixed error-type tag.
    pub error_count: CounterVec,
    /// Requests currently in flight.
    pub active_requests: Gauge,
    /// Version identity, rendered as a single info line.
    pub version_info: InfoRecord,
    /// Business operations by operation name and outcome.
    pub business_operations: CounterVec,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            request_count: CounterVec::new(&["method", "endpoint", "status"]),
            request_duration: HistogramVec::new(&["method", "endpoint"], DURATION_BUCKETS),
            request_size: HistogramVec::new(&["method", "endpoint"], SIZE_BUCKETS),
            response_size: HistogramVec::new(&["method", "endpoint"], SIZE_BUCKETS),
            error_count: CounterVec::new(&["error_type"]),
            active_requests: Gauge::new(),
            version_info: InfoRecord::new(),
            business_operations: CounterVec::new(&["operation", "status"]),
        }
    }

    /// Seed the version info record. Absent build/commit render as "unknown".
    pub fn initialize(&self, version: &VersionInfo) {
        self.version_info.record(&[
            ("version", &version.version),
            ("build", version.build_number.as_deref().unwrap_or("unknown")),
            ("commit", version.git_commit.as_deref().unwrap_or("unknown")),
        ]);
    }

    /// Fold one completed request observation into the registry.
    pub fn track_request(
        &self,
        method: &str,
        endpoint: &str,
        status: u16,
        duration: Duration,
        request_size: u64,
        response_size: u64,
    ) {
        let status = status.to_string();
        self.request_count.inc(&[method, endpoint, &status]);
        self.request_duration
            .observe(&[method, endpoint], duration.as_secs_f64());
        self.request_size
            .observe(&[method, endpoint], request_size as f64);
        self.response_size
            .observe(&[method, endpoint], response_size as f64);
    }

    /// Count an application error under a bounded error-type tag.
    pub fn track_error(&self, error_type: &str) {
        self.error_count.inc(&[error_type]);
    }

    /// Count a business operation outcome.
    pub fn track_operation(&self, operation: &str, status: &str) {
        self.business_operations.inc(&[operation, status]);
    }

    /// Serialize every registered family in the Prometheus text format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.request_count
            .render("http_requests_total", "Total HTTP requests", &mut out);
        self.request_duration.render(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
            &mut out,
        );
        self.request_size.render(
            "http_request_size_bytes",
            "HTTP request size in bytes",
            &mut out,
        );
        self.response_size.render(
            "http_response_size_bytes",
            "HTTP response size in bytes",
            &mut out,
        );
        self.error_count
            .render("app_errors_total", "Total application errors", &mut out);
        self.active_requests.render(
            "http_requests_active",
            "Number of active HTTP requests",
            &mut out,
        );
        self.version_info.render(
            "app_version_info",
            "Application version information",
            &mut out,
        );
        self.business_operations.render(
            "business_operations_total",
            "Total business operations",
            &mut out,
        );
        out
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
