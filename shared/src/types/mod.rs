//! Type definitions shared by the HTTP surface
//!
//! - `response` - JSON error body and health check payloads

pub mod response;

pub use response::{ErrorBody, HealthResponse, HealthStatus};
