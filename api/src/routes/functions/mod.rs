//! Phone-code login endpoints under `/functions/v1`
//!
//! - `generate-code`: issue a code for a phone number
//! - `verify-code`: consume a code and return the user

pub mod generate_code;
pub mod verify_code;

use std::sync::Arc;

use pf_core::repositories::UserRepository;
use pf_core::services::verification::VerificationService;

pub use generate_code::generate_code;
pub use verify_code::verify_code;

/// Application state that holds shared services
pub struct AppState<U: UserRepository> {
    pub verification_service: Arc<VerificationService<U>>,
}

impl<U: UserRepository> AppState<U> {
    pub fn new(verification_service: Arc<VerificationService<U>>) -> Self {
        Self {
            verification_service,
        }
    }
}
