//! Vidnorm API Library
//!
//! This crate provides the HTTP handlers and application setup around the
//! ingestion pipeline. The binary lives in `main.rs`; the library exists so
//! integration tests can build the router directly.

mod handlers;
mod telemetry;

// Public modules
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::ErrorResponse;
pub use telemetry::init_telemetry;
