//! JSON bodies for payload errors raised by actix extractors
//!
//! The `web::Bytes` extractor rejects bodies over the configured limit with a
//! plain-text 413 before the handler runs. The handler registered here
//! replaces that response with the usual JSON error body.

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};

use pf_shared::types::ErrorBody;

use crate::handlers::error::{json_error, PAYLOAD_TOO_LARGE};

/// Middleware rewriting extractor payload errors as JSON
pub fn payload_errors<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().handler(StatusCode::PAYLOAD_TOO_LARGE, payload_too_large)
}

fn payload_too_large<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    tracing::warn!(
        path = %res.request().path(),
        event = "payload_too_large",
        "Request body exceeded the payload limit"
    );

    let (req, _) = res.into_parts();
    let response = json_error(StatusCode::PAYLOAD_TOO_LARGE, ErrorBody::new(PAYLOAD_TOO_LARGE));
    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body(),
    ))
}
