//! Application factory
//!
//! Builds the Actix-web application from the shared state so the binary and
//! the integration tests serve exactly the same routes.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{Method, StatusCode};
use actix_web::{web, App, Error, HttpResponse};
use tracing_actix_web::TracingLogger;

use pf_core::repositories::UserRepository;
use pf_shared::config::CorsConfig;
use pf_shared::types::ErrorBody;

use crate::handlers::error::json_error;
use crate::middleware::cors::{cors_headers, preflight};
use crate::middleware::payload::payload_errors;
use crate::routes::functions::{generate_code, verify_code, AppState};
use crate::routes::health::health_check;

/// Create and configure the application with all dependencies
pub fn create_app<U>(
    app_state: web::Data<AppState<U>>,
    cors: &CorsConfig,
    max_payload_size: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
{
    App::new()
        .app_data(app_state)
        .app_data(web::PayloadConfig::new(max_payload_size))
        .wrap(payload_errors())
        .wrap(cors_headers(cors))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/functions/v1")
                .service(
                    web::resource("/generate-code")
                        .route(web::post().to(generate_code::<U>))
                        .route(web::method(Method::OPTIONS).to(preflight))
                        .default_service(web::to(method_not_allowed)),
                )
                .service(
                    web::resource("/verify-code")
                        .route(web::post().to(verify_code::<U>))
                        .route(web::method(Method::OPTIONS).to(preflight))
                        .default_service(web::to(method_not_allowed)),
                ),
        )
        .default_service(web::to(not_found))
}

async fn method_not_allowed() -> HttpResponse {
    json_error(
        StatusCode::METHOD_NOT_ALLOWED,
        ErrorBody::new("Method not allowed"),
    )
}

async fn not_found() -> HttpResponse {
    json_error(StatusCode::NOT_FOUND, ErrorBody::new("Not found"))
}
