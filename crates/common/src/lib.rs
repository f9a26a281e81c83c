//! Shared utilities, configuration, and error handling for the chat widget backend
//!
//! This crate provides common functionality used across the workspace:
//! - Configuration loaded once from the environment
//! - Error types and their HTTP mapping
//! - bcrypt password hashing
//! - Validated JSON extraction

pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod extractors;

pub use config::Config;
pub use crypto::{hash_password, verify_password};
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
