//! Configuration for the verification service

use pf_shared::config::{PhoneMatching, VerificationConfig};
use pf_shared::utils::phone::DEFAULT_COUNTRY_CODE;

use crate::domain::entities::verification_code::DEFAULT_EXPIRATION_MINUTES;

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Country code prepended during issuer normalization
    pub country_code: String,
    /// Number of minutes before a verification code expires
    pub code_expiration_minutes: i64,
    /// Whether the verifier rejects expired codes
    pub enforce_expiry: bool,
    /// How the verifier maps the submitted phone to the stored form
    pub phone_matching: PhoneMatching,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            code_expiration_minutes: DEFAULT_EXPIRATION_MINUTES,
            enforce_expiry: true,
            phone_matching: PhoneMatching::Legacy,
        }
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            country_code: config.country_code.clone(),
            code_expiration_minutes: config.code_expiration_minutes,
            enforce_expiry: config.enforce_expiry,
            phone_matching: config.phone_matching,
        }
    }
}
