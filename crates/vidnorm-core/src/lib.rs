//! Vidnorm Core Library
//!
//! This crate provides the core domain models, error types, and configuration
//! that are shared across all vidnorm components.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{ContainerFormat, IngestionResult, IngestionStatus, StorageRole, VideoId};
