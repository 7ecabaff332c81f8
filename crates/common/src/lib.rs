//! Shared utilities, configuration, and error handling for the chatbot
//!
//! This crate provides common functionality used across the workspace:
//! - Configuration management following 12-factor principles
//! - Error types and their HTTP mapping
//! - Request extractors with validation
//! - State machine errors shared by client and server

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod state;

pub use config::{Config, StorageBackend};
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::{ApiPath, ValidatedJson};
pub use state::StateError;
