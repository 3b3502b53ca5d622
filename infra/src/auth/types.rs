//! Wire shapes of the GoTrue-compatible auth API

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pf_core::domain::entities::session::{RemoteSession, UserData};

/// User object returned by `/user` and embedded in token responses
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: Uuid,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl ProviderUser {
    /// Normalize to the shape sessions carry
    ///
    /// The provider sends empty strings for unset phone and email.
    pub fn to_user_data(&self) -> UserData {
        let name = ["name", "full_name"]
            .iter()
            .find_map(|field| self.user_metadata.get(field)?.as_str())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        UserData {
            id: self.id,
            phone_number: self.phone.clone().unwrap_or_default(),
            name,
            email: self.email.clone().filter(|email| !email.is_empty()),
        }
    }
}

/// Body of `POST /token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Lifetime in seconds
    pub expires_in: i64,

    /// Absolute expiry as a Unix timestamp, when the provider sends one
    #[serde(default)]
    pub expires_at: Option<i64>,

    pub user: ProviderUser,
}

impl TokenResponse {
    pub fn into_session(self, now: DateTime<Utc>) -> RemoteSession {
        let expires_at = self
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(|| now + Duration::seconds(self.expires_in));

        RemoteSession {
            user: self.user.to_user_data(),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest<'a> {
    pub refresh_token: &'a str,
}

/// Error payload; field names differ between provider versions
#[derive(Debug, Default, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub error_description: Option<String>,

    #[serde(default)]
    pub msg: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl ProviderErrorBody {
    pub fn describe(&self) -> Option<&str> {
        self.error_description
            .as_deref()
            .or(self.msg.as_deref())
            .or(self.message.as_deref())
            .or(self.error.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN_BODY: &str = r#"{
        "access_token": "eyJhbGciOiJIUzI1NiJ9.e30.sig",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1893456000,
        "refresh_token": "r-123",
        "user": {
            "id": "8f14e45f-ceea-467f-a0f6-3d2b7c8e1a11",
            "aud": "authenticated",
            "phone": "56912345678",
            "email": "",
            "user_metadata": { "full_name": "Ana Pérez" }
        }
    }"#;

    #[test]
    fn test_token_response_to_session() {
        let response: TokenResponse = serde_json::from_str(TOKEN_BODY).unwrap();
        let session = response.into_session(Utc::now());

        assert_eq!(session.access_token, "eyJhbGciOiJIUzI1NiJ9.e30.sig");
        assert_eq!(session.refresh_token.as_deref(), Some("r-123"));
        assert_eq!(session.expires_at.timestamp(), 1_893_456_000);
        assert_eq!(session.user.phone_number, "56912345678");
        assert_eq!(session.user.name.as_deref(), Some("Ana Pérez"));
        assert_eq!(session.user.email, None);
    }

    #[test]
    fn test_expiry_falls_back_to_expires_in() {
        let mut value: serde_json::Value = serde_json::from_str(TOKEN_BODY).unwrap();
        value.as_object_mut().unwrap().remove("expires_at");
        let response: TokenResponse = serde_json::from_value(value).unwrap();

        let now = Utc::now();
        let session = response.into_session(now);
        assert_eq!(session.expires_at, now + Duration::seconds(3600));
    }

    #[test]
    fn test_user_without_metadata() {
        let user: ProviderUser = serde_json::from_str(
            r#"{ "id": "8f14e45f-ceea-467f-a0f6-3d2b7c8e1a11", "email": "ana@example.com" }"#,
        )
        .unwrap();

        let data = user.to_user_data();
        assert_eq!(data.name, None);
        assert_eq!(data.phone_number, "");
        assert_eq!(data.email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn test_error_body_description_order() {
        let body: ProviderErrorBody = serde_json::from_str(
            r#"{ "error": "invalid_grant", "error_description": "Refresh Token Not Found" }"#,
        )
        .unwrap();
        assert_eq!(body.describe(), Some("Refresh Token Not Found"));

        let body: ProviderErrorBody =
            serde_json::from_str(r#"{ "code": 401, "msg": "invalid JWT" }"#).unwrap();
        assert_eq!(body.describe(), Some("invalid JWT"));

        assert_eq!(ProviderErrorBody::default().describe(), None);
    }
}
