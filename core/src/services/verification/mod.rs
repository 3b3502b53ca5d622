//! Verification service module for phone-code login
//!
//! This module provides the two halves of the code workflow:
//! - Code issuance against a normalized phone (one write per call)
//! - Code verification with atomic single-use invalidation

mod config;
mod service;
mod types;


pub use config::VerificationServiceConfig;
pub use service::VerificationService;
pub use types::IssuedCode;
