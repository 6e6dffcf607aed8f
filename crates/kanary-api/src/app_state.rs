//! Shared application state for the kanary API.
//!
//! The metrics registry is the only shared mutable resource; it is created
//! once here and handed by `Arc` to the tracker middleware and every handler.
//! No hidden module-level singletons.

use std::sync::Arc;
use std::time::{Duration, Instant};

use kanary_core::{MetricsRegistry, VersionInfo};

use crate::config::Settings;
use crate::probes::{ProcSampler, SystemSampler};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    settings: Settings,
    version: VersionInfo,
    metrics: Arc<MetricsRegistry>,
    sampler: Box<dyn SystemSampler>,
    started: Instant,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self::with_sampler(settings, Box::new(ProcSampler))
    }

    /// Build state with an injected system sampler (test seam).
    pub fn with_sampler(settings: Settings, sampler: Box<dyn SystemSampler>) -> Self {
        let version = VersionInfo::new(settings.version.clone())
            .with_build(settings.build_number.clone())
            .with_commit(settings.git_commit.clone())
            .with_branch(settings.git_branch.clone())
            .with_environment(Some(settings.app_env.clone()));

        let metrics = Arc::new(MetricsRegistry::new());
        metrics.initialize(&version);

        Self {
            inner: Arc::new(AppStateInner {
                settings,
                version,
                metrics,
                sampler,
                started: Instant::now(),
            }),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn version(&self) -> &VersionInfo {
        &self.inner.version
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.inner.metrics
    }

    pub fn metrics_handle(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn sampler(&self) -> &dyn SystemSampler {
        self.inner.sampler.as_ref()
    }

    pub fn uptime(&self) -> Duration {
        self.inner.started.elapsed()
    }
}
