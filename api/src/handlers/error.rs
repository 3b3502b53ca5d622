//! Mapping of domain errors to the JSON error bodies of each endpoint

use actix_web::http::StatusCode;
use actix_web::HttpResponse;

use pf_core::errors::{AuthError, DomainError};
use pf_shared::types::ErrorBody;

pub const EMPTY_BODY: &str = "Empty request body";
pub const INVALID_JSON: &str = "Invalid JSON in request body";
pub const PHONE_REQUIRED: &str = "Phone number is required";
pub const PHONE_AND_CODE_REQUIRED: &str = "Phone number and code are required";
pub const LOOKUP_FAILED: &str = "Error finding user";
pub const PERSIST_FAILED: &str = "Database operation failed";
pub const VERIFY_FAILED: &str = "Error al verificar código";
pub const INTERNAL: &str = "Internal server error";
pub const PAYLOAD_TOO_LARGE: &str = "Request body too large";

/// JSON error response with an explicit status
pub fn json_error(status: StatusCode, body: ErrorBody) -> HttpResponse {
    HttpResponse::build(status).json(body)
}

pub fn bad_request(message: &str) -> HttpResponse {
    json_error(StatusCode::BAD_REQUEST, ErrorBody::new(message))
}

pub fn invalid_json(error: &serde_json::Error) -> HttpResponse {
    json_error(
        StatusCode::BAD_REQUEST,
        ErrorBody::new(INVALID_JSON).with_details(error.to_string()),
    )
}

fn server_error(message: &str, error: &DomainError) -> HttpResponse {
    let details = error.details().unwrap_or_else(|| error.to_string());
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorBody::new(message).with_details(details),
    )
}

/// Response for a failed code issuance
pub fn generate_code_error(error: &DomainError) -> HttpResponse {
    match error {
        DomainError::ValidationErr(_) | DomainError::Validation { .. } => {
            bad_request(PHONE_REQUIRED)
        }
        DomainError::UserLookup { .. } => server_error(LOOKUP_FAILED, error),
        DomainError::Persistence { .. } => server_error(PERSIST_FAILED, error),
        _ => server_error(INTERNAL, error),
    }
}

/// Response for a failed verification
pub fn verify_code_error(error: &DomainError) -> HttpResponse {
    match error {
        DomainError::ValidationErr(_) | DomainError::Validation { .. } => {
            bad_request(PHONE_AND_CODE_REQUIRED)
        }
        DomainError::Auth(AuthError::IncorrectCode) => json_error(
            StatusCode::UNAUTHORIZED,
            ErrorBody::new(AuthError::IncorrectCode.to_string()),
        ),
        _ => server_error(VERIFY_FAILED, error),
    }
}
