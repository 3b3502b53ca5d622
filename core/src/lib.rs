//! # Pawfile Core
//!
//! Core domain layer for the Pawfile backend: phone-code verification,
//! client session reconciliation and route guarding. Infrastructure
//! implementations of the traits defined here live in `pf_infra`.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
