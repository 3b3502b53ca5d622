//! Session shapes held by the client: the custom session persisted after a
//! code verification, and the managed provider's own session.
//!
//! Both are exposed through [`SessionSource`] so callers read `user` and
//! `expires_at` without caring where the session came from.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimal user payload returned by the verifier and stored in sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub id: Uuid,
    pub phone_number: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Session persisted under the `userSession` key
///
/// Serialized as `{ "user": {...}, "expiresAt": "<RFC 3339>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSession {
    pub user: UserData,

    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

impl CustomSession {
    /// Session for `user` valid for `ttl` from `now`
    pub fn new(user: UserData, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            user,
            expires_at: now + ttl,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Session issued by the managed auth provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSession {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    pub expires_at: DateTime<Utc>,

    pub user: UserData,
}

impl RemoteSession {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Where the active session came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum SessionSource {
    Local(CustomSession),
    Remote(RemoteSession),
}

impl SessionSource {
    pub fn user(&self) -> &UserData {
        match self {
            SessionSource::Local(session) => &session.user,
            SessionSource::Remote(session) => &session.user,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        match self {
            SessionSource::Local(session) => session.expires_at,
            SessionSource::Remote(session) => session.expires_at,
        }
    }

    /// A session is valid iff it expires strictly after `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at() > now
    }

    pub fn is_local(&self) -> bool {
        matches!(self, SessionSource::Local(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SessionSource::Remote(_))
    }
}

impl From<CustomSession> for SessionSource {
    fn from(session: CustomSession) -> Self {
        SessionSource::Local(session)
    }
}

impl From<RemoteSession> for SessionSource {
    fn from(session: RemoteSession) -> Self {
        SessionSource::Remote(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_user() -> UserData {
        UserData {
            id: Uuid::parse_str("8f14e45f-ceea-467f-a0f6-3d2b7c8e1a11").unwrap(),
            phone_number: "56912345678".to_string(),
            name: Some("Ana".to_string()),
            email: None,
        }
    }

    #[test]
    fn test_custom_session_wire_format() {
        let expires_at = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let session = CustomSession {
            user: sample_user(),
            expires_at,
        };

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["expiresAt"], "2030-01-02T03:04:05Z");
        assert_eq!(value["user"]["phone_number"], "56912345678");
        assert!(value["user"]["email"].is_null());

        let parsed: CustomSession = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, session);
    }

    #[test]
    fn test_custom_session_accepts_client_timestamps() {
        let raw = r#"{
            "user": {
                "id": "8f14e45f-ceea-467f-a0f6-3d2b7c8e1a11",
                "phone_number": "56912345678",
                "name": null,
                "email": null
            },
            "expiresAt": "2030-01-02T03:04:05.678Z"
        }"#;

        let parsed: CustomSession = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.user.phone_number, "56912345678");
        assert_eq!(parsed.expires_at.timestamp_subsec_millis(), 678);
    }

    #[test]
    fn test_validity_is_strict() {
        let now = Utc::now();
        let session = SessionSource::from(CustomSession::new(sample_user(), now, Duration::zero()));

        assert!(!session.is_valid_at(now));
        assert!(session.is_valid_at(now - Duration::seconds(1)));
    }

    #[test]
    fn test_source_exposes_same_shape() {
        let now = Utc::now();
        let remote = SessionSource::from(RemoteSession {
            access_token: "access".to_string(),
            refresh_token: None,
            expires_at: now + Duration::hours(1),
            user: sample_user(),
        });

        assert!(remote.is_remote());
        assert_eq!(remote.user().phone_number, "56912345678");
        assert_eq!(remote.expires_at(), now + Duration::hours(1));
    }
}
