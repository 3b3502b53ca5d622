use actix_web::{web, HttpResponse};
use validator::Validate;

use pf_core::repositories::UserRepository;
use pf_shared::utils::phone::mask_phone_number;

use crate::dto::functions::{parse_body, VerifyCodeRequest};
use crate::handlers::error::{bad_request, invalid_json, verify_code_error, PHONE_AND_CODE_REQUIRED};

use super::AppState;

/// Handler for POST /functions/v1/verify-code
///
/// Checks the code issued for a phone number and consumes it. A code is
/// accepted at most once.
///
/// # Request Body
///
/// ```json
/// { "phone_number": "+56912345678", "code": "48213" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// A one-element array with the verified user:
/// ```json
/// [{ "id": "…", "phone_number": "56912345678", "name": null, "email": null }]
/// ```
///
/// ## Errors
/// - 400 Bad Request: malformed JSON, missing phone or code
/// - 401 Unauthorized: `Código incorrecto`
/// - 500 Internal Server Error: lookup failed
pub async fn verify_code<U>(state: web::Data<AppState<U>>, body: web::Bytes) -> HttpResponse
where
    U: UserRepository + 'static,
{
    let request: VerifyCodeRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "verify-code body is not valid JSON");
            return invalid_json(&e);
        }
    };

    if request.validate().is_err() {
        return bad_request(PHONE_AND_CODE_REQUIRED);
    }

    tracing::info!(
        phone = %mask_phone_number(&request.phone_number),
        "Processing verify-code request"
    );

    match state
        .verification_service
        .verify_code(&request.phone_number, &request.code)
        .await
    {
        Ok(user) => HttpResponse::Ok().json([user]),
        Err(error) => verify_code_error(&error),
    }
}
