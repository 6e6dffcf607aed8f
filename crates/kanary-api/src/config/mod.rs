//! Settings loader (environment-sourced, strict validation).
//!
//! All keys are read once at process start; there is no hot-reload contract.
//! Lookup goes through a closure so tests can inject values without touching
//! the process environment.

pub mod schema;

use kanary_core::error::Result;

pub use schema::Settings;

pub fn load_from_env() -> Result<Settings> {
    Settings::from_lookup(|key| std::env::var(key).ok())
}
