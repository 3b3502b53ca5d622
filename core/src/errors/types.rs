//! Error types for authentication and input validation

use thiserror::Error;

/// Authentication-related errors
///
/// `IncorrectCode` carries the exact user-facing message the verify endpoint
/// returns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No row matched the phone and code, or the code had expired
    #[error("Código incorrecto")]
    IncorrectCode,

    /// Provider sign-out failed; the user stays signed in remotely
    #[error("Error al cerrar sesión: {message}")]
    SignOutFailed { message: String },
}

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },
}
