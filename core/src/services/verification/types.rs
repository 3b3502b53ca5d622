//! Types for verification service results

use chrono::{DateTime, Utc};

/// Result of issuing a code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCode {
    /// Phone number as stored on the user row
    pub phone_number: String,
    /// The 5-digit code now outstanding for that phone
    pub security_code: String,
    /// Instant the code stops being accepted
    pub expires_at: DateTime<Utc>,
}
