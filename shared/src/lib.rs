//! Shared configuration, types and utilities for the Pawfile backend
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - The JSON error body returned by every endpoint
//! - Phone number normalization and masking

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, CorsConfig, DatabaseConfig, Environment, LoggingConfig,
    ManagedAuthConfig, PhoneMatching, ServerConfig, SessionConfig, VerificationConfig,
};
pub use types::{ErrorBody, HealthResponse, HealthStatus};
pub use utils::phone;
