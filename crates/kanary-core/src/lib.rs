//! kanary core: metrics registry, health model, version metadata, and error types.
//!
//! This crate defines the observability contracts shared by the API service and
//! its tests. It intentionally carries no HTTP or runtime dependencies so the
//! registry and health model can be exercised without a server.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `ApiError`/`Result` so production
//! processes do not crash on malformed input.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod health;
pub mod metrics;
pub mod version;

/// Shared result type.
pub use error::{ApiError, Result};
pub use metrics::MetricsRegistry;
pub use version::VersionInfo;
