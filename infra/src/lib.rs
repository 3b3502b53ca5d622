//! # Infrastructure Layer
//!
//! Concrete implementations of the traits defined in `pf_core`:
//! - **Database**: Postgres user repository using SQLx
//! - **Cache**: Redis client and Redis-backed session storage
//! - **Storage**: file-backed session storage for native clients
//! - **Auth**: HTTP client for the GoTrue-compatible managed auth provider

use std::sync::Arc;

use pf_core::errors::DomainError;
use pf_shared::config::{AppConfig, Environment};

pub mod auth;
pub mod cache;
pub mod database;
pub mod storage;

pub use auth::HttpManagedAuth;
pub use cache::{RedisClient, RedisSessionStorage};
pub use database::{DatabasePool, PgUserRepository};
pub use storage::FileSessionStorage;

/// Configuration module for infrastructure services
pub mod config {
    //! Re-exports of the shared configuration consumed by this crate

    pub use pf_shared::config::{CacheConfig, DatabaseConfig, ManagedAuthConfig};
}

/// Handles the server needs at runtime
#[derive(Clone)]
pub struct InfrastructureServices {
    pub database: DatabasePool,
    pub users: Arc<PgUserRepository>,
}

/// Connect the database pool and build the repositories on top of it
pub async fn initialize(config: &AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!("Initializing infrastructure services...");

    let database = DatabasePool::new(config.database.clone()).await?;
    if !database.health_check().await? {
        tracing::warn!("Database answered the health check with an unexpected value");
    }
    let users = Arc::new(PgUserRepository::new(database.get_pool().clone()));

    tracing::info!("Infrastructure services initialized successfully");

    Ok(InfrastructureServices { database, users })
}

/// Load `.env` files for the current environment, then read [`AppConfig`]
///
/// The environment-specific file wins over `.env` because dotenvy never
/// overwrites a variable that is already set.
pub fn load_config() -> AppConfig {
    let environment = Environment::from_env();
    if let Err(e) = dotenvy::from_filename(environment.env_file()) {
        tracing::debug!(file = environment.env_file(), error = %e, "No environment file loaded");
    }
    dotenvy::dotenv().ok();

    AppConfig::from_env()
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for the managed auth provider
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        let message = err.to_string();
        match err {
            InfrastructureError::Database(_) => DomainError::Persistence { message },
            InfrastructureError::Cache(_)
            | InfrastructureError::Io(_)
            | InfrastructureError::Serialization(_) => DomainError::Storage { message },
            InfrastructureError::Http(_) => DomainError::Provider { message },
            InfrastructureError::Config(_) | InfrastructureError::General(_) => {
                DomainError::Internal { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_failures_map_to_storage_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DomainError = InfrastructureError::from(io).into();
        assert!(matches!(err, DomainError::Storage { .. }));
        assert!(err.details().unwrap_or_default().contains("denied"));
    }

    #[test]
    fn test_config_errors_map_to_internal() {
        let err: DomainError = InfrastructureError::Config("bad url".to_string()).into();
        assert!(matches!(err, DomainError::Internal { .. }));
    }
}
