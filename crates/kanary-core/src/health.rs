//! Health/readiness response model.
//!
//! Liveness and startup are unconditional "process is alive" signals;
//! readiness aggregates per-check results and flips the HTTP status. The
//! asymmetry is deliberate: liveness failures should only ever mean the
//! process is wedged, never transient resource pressure.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Overall status reported by the probe endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

/// Result of one readiness check. Produced fresh per call, never cached.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub healthy: bool,
    pub message: String,
    pub details: BTreeMap<String, serde_json::Value>,
}

impl CheckResult {
    pub fn healthy(message: impl Into<String>) -> Self {
        Self {
            healthy: true,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Body of `/health/live` and `/health/startup`.
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl ProbeResponse {
    pub fn alive(version: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Ok,
            timestamp: Utc::now(),
            version: version.into(),
        }
    }
}

/// Body of `/health/ready`. `checks` is the flat per-check mapping.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub checks: BTreeMap<String, CheckResult>,
}

impl ReadinessResponse {
    /// Aggregate: ready iff every check is healthy.
    pub fn new(version: impl Into<String>, checks: BTreeMap<String, CheckResult>) -> Self {
        let ready = checks.values().all(|c| c.healthy);
        Self {
            status: if ready {
                HealthStatus::Ok
            } else {
                HealthStatus::Error
            },
            timestamp: Utc::now(),
            version: version.into(),
            checks,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}
