//! User repository trait defining the interface for user data persistence.
//!
//! The trait is async-first. Every method maps to a single statement against
//! the `users` table, so callers get exactly one write per operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
///
/// Implementations report read failures as [`DomainError::UserLookup`] and
/// write failures as [`DomainError::Persistence`]; "no rows" is never an error.
///
/// # Example
/// ```no_run
/// # use pf_core::repositories::UserRepository;
/// # async fn example(repo: &impl UserRepository) -> Result<(), Box<dyn std::error::Error>> {
/// match repo.find_by_phone("56912345678").await? {
///     Some(user) => println!("User found: {:?}", user.id),
///     None => println!("User not found"),
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by stored-form phone number
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with that phone
    /// * `Err(DomainError::UserLookup)` - Database error occurred
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, DomainError>;

    /// Insert a new user row
    ///
    /// # Returns
    /// * `Ok(User)` - The inserted row as stored
    /// * `Err(DomainError::Persistence)` - Insert failed (e.g., duplicate phone)
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Overwrite the outstanding code and expiry for a phone
    ///
    /// # Returns
    /// * `Ok(User)` - The updated row
    /// * `Err(DomainError::Persistence)` - Update failed or no row matched
    async fn update_code(
        &self,
        phone_number: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<User, DomainError>;

    /// Atomically match `(phone_number, code)` and clear the code
    ///
    /// When `valid_at` is set, rows whose `code_expires_at` is not strictly
    /// after it do not match. The returned row reflects the state before the
    /// clear except that `security_code` and `code_expires_at` are `None`.
    ///
    /// # Returns
    /// * `Ok(Some(User))` - The code matched and was cleared
    /// * `Ok(None)` - No row matched
    /// * `Err(DomainError::UserLookup)` - Database error occurred
    async fn consume_code(
        &self,
        phone_number: &str,
        code: &str,
        valid_at: Option<DateTime<Utc>>,
    ) -> Result<Option<User>, DomainError>;
}
