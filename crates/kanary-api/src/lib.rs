//! kanary API library entry.
//!
//! Wires settings, shared state, the request tracker, operational endpoints,
//! readiness probes, and the demo endpoints into one axum service. Consumed
//! by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod demo;
pub mod error;
pub mod obs;
pub mod ops;
pub mod probes;
pub mod router;
