//! Top-level facade crate for kanary.
//!
//! Re-exports core types and the API library so users can depend on a single crate.

pub mod core {
    pub use kanary_core::*;
}

pub mod api {
    pub use kanary_api::*;
}
