//! Main verification service implementation

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use pf_shared::config::PhoneMatching;
use pf_shared::utils::phone::{mask_phone_number, normalize_phone_number, strip_plus_prefix};

use crate::domain::entities::session::UserData;
use crate::domain::entities::user::User;
use crate::domain::entities::verification_code::generate_code;
use crate::errors::{AuthError, DomainResult, ValidationError};
use crate::repositories::UserRepository;

use super::config::VerificationServiceConfig;
use super::types::IssuedCode;

/// Verification service issuing and consuming one-time phone codes
pub struct VerificationService<R: UserRepository> {
    /// User repository holding codes on the user row
    user_repository: Arc<R>,
    /// Service configuration
    config: VerificationServiceConfig,
}

impl<R: UserRepository> VerificationService<R> {
    /// Create a new verification service
    pub fn new(user_repository: Arc<R>, config: VerificationServiceConfig) -> Self {
        Self {
            user_repository,
            config,
        }
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Issue a fresh code for `phone`
    ///
    /// The phone is normalized, a new code is generated, and the user row is
    /// updated (or inserted when none exists). Any previously outstanding code
    /// for the phone is overwritten.
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedCode)` - The stored phone and the new code
    /// * `Err(DomainError::ValidationErr)` - Phone missing or blank
    /// * `Err(DomainError::UserLookup)` - Reading the user row failed
    /// * `Err(DomainError::Persistence)` - Writing the user row failed
    pub async fn issue_code(&self, phone: &str) -> DomainResult<IssuedCode> {
        self.issue_code_at(phone, Utc::now()).await
    }

    /// [`issue_code`](Self::issue_code) with an explicit clock reading
    pub async fn issue_code_at(&self, phone: &str, now: DateTime<Utc>) -> DomainResult<IssuedCode> {
        if phone.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: "phone_number".to_string(),
            }
            .into());
        }

        let normalized = normalize_phone_number(phone, &self.config.country_code);
        let code = generate_code();
        let expires_at = now + Duration::minutes(self.config.code_expiration_minutes);

        let existing = self
            .user_repository
            .find_by_phone(&normalized)
            .await
            .map_err(|e| {
                tracing::error!(
                    phone = %mask_phone_number(&normalized),
                    error = %e,
                    event = "user_lookup_failed",
                    "Failed to look up user for code issuance"
                );
                e
            })?;

        let user = match existing {
            Some(_) => {
                self.user_repository
                    .update_code(&normalized, &code, expires_at)
                    .await
            }
            None => {
                self.user_repository
                    .create(User::with_code(normalized.clone(), code.clone(), expires_at))
                    .await
            }
        }
        .map_err(|e| {
            tracing::error!(
                phone = %mask_phone_number(&normalized),
                error = %e,
                event = "code_persist_failed",
                "Failed to store security code"
            );
            e
        })?;

        tracing::info!(
            phone = %mask_phone_number(&user.phone_number),
            user_id = %user.id,
            expires_at = %expires_at,
            event = "code_issued",
            "Issued security code"
        );

        Ok(IssuedCode {
            security_code: user.security_code.unwrap_or(code),
            phone_number: user.phone_number,
            expires_at: user.code_expires_at.unwrap_or(expires_at),
        })
    }

    /// Verify `code` for `phone` and consume it
    ///
    /// Matching and invalidation happen in one repository call, so a code is
    /// accepted at most once.
    ///
    /// # Returns
    ///
    /// * `Ok(UserData)` - The code matched and was cleared
    /// * `Err(DomainError::Auth(AuthError::IncorrectCode))` - No match or expired
    /// * `Err(DomainError::ValidationErr)` - Phone or code missing
    /// * `Err(DomainError::UserLookup)` - Database error
    pub async fn verify_code(&self, phone: &str, code: &str) -> DomainResult<UserData> {
        self.verify_code_at(phone, code, Utc::now()).await
    }

    /// [`verify_code`](Self::verify_code) with an explicit clock reading
    pub async fn verify_code_at(
        &self,
        phone: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<UserData> {
        if phone.is_empty() || code.is_empty() {
            return Err(ValidationError::RequiredField {
                field: if phone.is_empty() { "phone_number" } else { "code" }.to_string(),
            }
            .into());
        }

        let lookup_phone = self.match_phone(phone);
        let valid_at = self.config.enforce_expiry.then_some(now);

        let consumed = self
            .user_repository
            .consume_code(&lookup_phone, code, valid_at)
            .await
            .map_err(|e| {
                tracing::error!(
                    phone = %mask_phone_number(&lookup_phone),
                    error = %e,
                    event = "code_lookup_failed",
                    "Failed to verify security code"
                );
                e
            })?;

        match consumed {
            Some(user) => {
                tracing::info!(
                    phone = %mask_phone_number(&user.phone_number),
                    user_id = %user.id,
                    event = "code_verified",
                    "Security code verified and cleared"
                );
                Ok(user.to_user_data())
            }
            None => {
                tracing::warn!(
                    phone = %mask_phone_number(&lookup_phone),
                    event = "code_rejected",
                    "Security code did not match"
                );
                Err(AuthError::IncorrectCode.into())
            }
        }
    }

    /// Map a submitted phone to the stored form per the matching policy
    fn match_phone(&self, phone: &str) -> String {
        match self.config.phone_matching {
            PhoneMatching::Legacy => strip_plus_prefix(phone).to_string(),
            PhoneMatching::Unified => normalize_phone_number(phone, &self.config.country_code),
        }
    }
}
