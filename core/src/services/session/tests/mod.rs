mod coordinator_tests;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::session::{CustomSession, RemoteSession, UserData};

pub(super) fn sample_user() -> UserData {
    UserData {
        id: Uuid::new_v4(),
        phone_number: "56912345678".to_string(),
        name: Some("Ana".to_string()),
        email: None,
    }
}

pub(super) fn custom_session(valid_for: Duration) -> CustomSession {
    CustomSession {
        user: sample_user(),
        expires_at: Utc::now() + valid_for,
    }
}

pub(super) fn remote_session() -> RemoteSession {
    remote_session_valid_for(Duration::hours(1))
}

pub(super) fn remote_session_valid_for(valid_for: Duration) -> RemoteSession {
    RemoteSession {
        access_token: "access-token".to_string(),
        refresh_token: Some("refresh-token".to_string()),
        expires_at: Utc::now() + valid_for,
        user: UserData {
            id: Uuid::new_v4(),
            phone_number: "56987654321".to_string(),
            name: None,
            email: Some("owner@example.com".to_string()),
        },
    }
}
