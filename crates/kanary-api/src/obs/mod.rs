//! Request observability.
//!
//! The tracker middleware wraps every inbound request and folds one
//! observation per request into the shared `MetricsRegistry`, matched-route
//! template included. The registry itself lives in `kanary-core`.

pub mod tracker;
