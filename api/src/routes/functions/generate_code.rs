use actix_web::{web, HttpResponse};
use validator::Validate;

use pf_core::repositories::UserRepository;
use pf_shared::utils::phone::mask_phone_number;

use crate::dto::functions::{parse_body, GenerateCodeRequest, GenerateCodeResponse};
use crate::handlers::error::{bad_request, generate_code_error, invalid_json, EMPTY_BODY, PHONE_REQUIRED};

use super::AppState;

/// Handler for POST /functions/v1/generate-code
///
/// Issues a fresh security code for a phone number, creating the user row
/// when the phone is new. Any previous code for the phone stops working.
///
/// # Request Body
///
/// ```json
/// { "phone_number": "+56 9 1234 5678" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "phone_number": "56912345678", "security_code": "48213" }
/// ```
///
/// ## Errors
/// - 400 Bad Request: empty body, malformed JSON or missing phone
/// - 500 Internal Server Error: user lookup or write failed
pub async fn generate_code<U>(state: web::Data<AppState<U>>, body: web::Bytes) -> HttpResponse
where
    U: UserRepository + 'static,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        tracing::warn!(event = "empty_body", "generate-code called without a body");
        return bad_request(EMPTY_BODY);
    }

    let request: GenerateCodeRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "generate-code body is not valid JSON");
            return invalid_json(&e);
        }
    };

    if request.validate().is_err() {
        return bad_request(PHONE_REQUIRED);
    }

    tracing::info!(
        phone = %mask_phone_number(&request.phone_number),
        "Processing generate-code request"
    );

    match state
        .verification_service
        .issue_code(&request.phone_number)
        .await
    {
        Ok(issued) => HttpResponse::Ok().json(GenerateCodeResponse::from(issued)),
        Err(error) => generate_code_error(&error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use std::sync::Arc;

    use pf_core::repositories::MockUserRepository;
    use pf_core::services::verification::{VerificationService, VerificationServiceConfig};

    fn state(repo: Arc<MockUserRepository>) -> web::Data<AppState<MockUserRepository>> {
        let service = VerificationService::new(repo, VerificationServiceConfig::default());
        web::Data::new(AppState::new(Arc::new(service)))
    }

    #[actix_rt::test]
    async fn test_whitespace_body_is_empty() {
        let repo = Arc::new(MockUserRepository::new());
        let resp = generate_code(state(repo.clone()), web::Bytes::from_static(b"  \n")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(repo.write_count(), 0);
    }

    #[actix_rt::test]
    async fn test_second_issue_overwrites_code() {
        let repo = Arc::new(MockUserRepository::new());
        let body = web::Bytes::from_static(br#"{"phone_number":"912345678"}"#);

        let resp = generate_code(state(repo.clone()), body.clone()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = generate_code(state(repo.clone()), body).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // One insert, then one update of the same row
        assert_eq!(repo.write_count(), 2);
        assert!(repo.get("56912345678").await.unwrap().security_code.is_some());
    }
}
