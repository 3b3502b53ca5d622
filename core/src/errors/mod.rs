//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::{AuthError, ValidationError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Reading a user row failed for a reason other than "no rows"
    #[error("User lookup failed: {message}")]
    UserLookup { message: String },

    /// Inserting or updating a user row failed
    #[error("Persistence failed: {message}")]
    Persistence { message: String },

    /// Session storage backend failed
    #[error("Session storage error: {message}")]
    Storage { message: String },

    /// Managed auth provider call failed
    #[error("Auth provider error: {message}")]
    Provider { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

impl DomainError {
    /// Upstream detail suitable for an error body's `details` field
    pub fn details(&self) -> Option<String> {
        match self {
            DomainError::UserLookup { message }
            | DomainError::Persistence { message }
            | DomainError::Storage { message }
            | DomainError::Provider { message }
            | DomainError::Internal { message } => Some(message.clone()),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
