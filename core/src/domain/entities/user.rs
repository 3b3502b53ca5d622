//! User entity representing a pet owner row in the `users` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::UserData;

/// User entity keyed by normalized phone number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Phone number in stored form (digits only, country prefix)
    pub phone_number: String,

    /// Display name, filled in after onboarding
    pub name: Option<String>,

    pub email: Option<String>,

    pub address: Option<String>,

    /// Outstanding one-time code, cleared when consumed
    pub security_code: Option<String>,

    /// Instant the outstanding code stops being accepted
    pub code_expires_at: Option<DateTime<Utc>>,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a user holding only a phone number
    pub fn new(phone_number: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            phone_number,
            name: None,
            email: None,
            address: None,
            security_code: None,
            code_expires_at: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Creates a user row carrying a freshly issued code
    pub fn with_code(phone_number: String, code: String, expires_at: DateTime<Utc>) -> Self {
        let mut user = Self::new(phone_number);
        user.security_code = Some(code);
        user.code_expires_at = Some(expires_at);
        user
    }

    /// Overwrites any outstanding code with a new one
    pub fn issue_code(&mut self, code: String, expires_at: DateTime<Utc>, now: DateTime<Utc>) {
        self.security_code = Some(code);
        self.code_expires_at = Some(expires_at);
        self.updated_at = Some(now);
    }

    /// Clears the outstanding code
    pub fn clear_code(&mut self) {
        self.security_code = None;
        self.code_expires_at = None;
    }

    /// Checks whether `code` is outstanding for this user at `now`
    ///
    /// With `enforce_expiry` off, the expiry column is ignored.
    pub fn accepts_code(&self, code: &str, now: DateTime<Utc>, enforce_expiry: bool) -> bool {
        let matches = self.security_code.as_deref() == Some(code);
        if !matches || !enforce_expiry {
            return matches;
        }
        self.code_expires_at.map_or(false, |expires_at| expires_at > now)
    }

    /// Projects the minimal payload returned after verification
    pub fn to_user_data(&self) -> UserData {
        UserData {
            id: self.id,
            phone_number: self.phone_number.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}
