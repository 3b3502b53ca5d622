//! Phone verification configuration

use serde::{Deserialize, Serialize};

use crate::utils::phone::DEFAULT_COUNTRY_CODE;

/// How the verifier turns the submitted phone into the stored form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PhoneMatching {
    /// Strip a single leading `+` only
    #[default]
    Legacy,
    /// Apply the same normalization the code issuer uses
    Unified,
}

impl std::str::FromStr for PhoneMatching {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(PhoneMatching::Legacy),
            "unified" => Ok(PhoneMatching::Unified),
            _ => Err(format!("Invalid phone matching policy: {}", s)),
        }
    }
}

/// Code issuance and verification settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Country calling code prepended during normalization
    pub country_code: String,

    /// Minutes an issued code stays valid
    pub code_expiration_minutes: i64,

    /// Reject codes whose expiry has passed
    pub enforce_expiry: bool,

    /// Verifier phone matching policy
    #[serde(default)]
    pub phone_matching: PhoneMatching,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            country_code: String::from(DEFAULT_COUNTRY_CODE),
            code_expiration_minutes: 5,
            enforce_expiry: true,
            phone_matching: PhoneMatching::Legacy,
        }
    }
}

impl VerificationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            country_code: std::env::var("PHONE_COUNTRY_CODE")
                .ok()
                .filter(|c| !c.is_empty() && c.chars().all(|ch| ch.is_ascii_digit()))
                .unwrap_or(defaults.country_code),
            code_expiration_minutes: std::env::var("CODE_EXPIRATION_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .filter(|m: &i64| *m > 0)
                .unwrap_or(defaults.code_expiration_minutes),
            enforce_expiry: std::env::var("VERIFY_ENFORCE_EXPIRY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enforce_expiry),
            phone_matching: std::env::var("VERIFY_PHONE_MATCHING")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.phone_matching),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VerificationConfig::default();
        assert_eq!(config.country_code, "56");
        assert_eq!(config.code_expiration_minutes, 5);
        assert!(config.enforce_expiry);
        assert_eq!(config.phone_matching, PhoneMatching::Legacy);
    }

    #[test]
    fn test_phone_matching_from_str() {
        assert_eq!("UNIFIED".parse::<PhoneMatching>().unwrap(), PhoneMatching::Unified);
        assert_eq!("legacy".parse::<PhoneMatching>().unwrap(), PhoneMatching::Legacy);
        assert!("strict".parse::<PhoneMatching>().is_err());
    }
}
