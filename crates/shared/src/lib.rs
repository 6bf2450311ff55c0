//! Shared errors and configuration for Snapfeed.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, StorageSettings, UploadConfig};
pub use error::{AppError, AppResult};
