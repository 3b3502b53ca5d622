//! CORS headers for browser clients
//!
//! Every response carries the same two headers, whatever its status. Preflight
//! requests are answered by [`preflight`] rather than by a CORS middleware so
//! the reply is the plain `ok` browsers already expect from these endpoints.

use actix_web::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN};
use actix_web::middleware::DefaultHeaders;
use actix_web::HttpResponse;

use pf_shared::config::CorsConfig;

/// Middleware adding the CORS headers to every response
pub fn cors_headers(config: &CorsConfig) -> DefaultHeaders {
    DefaultHeaders::new()
        .add((ACCESS_CONTROL_ALLOW_ORIGIN, config.allow_origin.clone()))
        .add((ACCESS_CONTROL_ALLOW_HEADERS, config.allow_headers.clone()))
}

/// `OPTIONS` handler; the request body is ignored
pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}
