//! Typed access to the persisted custom session

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use pf_shared::config::SessionConfig;
use pf_shared::utils::phone::mask_phone_number;

use crate::domain::entities::session::{CustomSession, UserData};
use crate::errors::{DomainError, DomainResult};

use super::storage::SessionStorage;

/// Key the custom session is stored under
pub const DEFAULT_SESSION_KEY: &str = "userSession";

/// Lifetime of a session created after verification
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// Reads, writes and purges the custom session in a [`SessionStorage`] slot
pub struct SessionStore<S: SessionStorage> {
    storage: Arc<S>,
    key: String,
    ttl: Duration,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Store using the default key and lifetime
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_config(storage, &SessionConfig::default())
    }

    pub fn with_config(storage: Arc<S>, config: &SessionConfig) -> Self {
        Self {
            storage,
            key: config.storage_key.clone(),
            ttl: Duration::days(config.ttl_days),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Read the persisted session if it is still valid
    ///
    /// Expired or unparseable values are removed and reported as `None`.
    /// Only a failing storage backend yields an error.
    pub async fn read(&self) -> DomainResult<Option<CustomSession>> {
        self.read_at(Utc::now()).await
    }

    pub async fn read_at(&self, now: DateTime<Utc>) -> DomainResult<Option<CustomSession>> {
        let Some(raw) = self.storage.get(&self.key).await? else {
            return Ok(None);
        };

        let session = match serde_json::from_str::<CustomSession>(&raw) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    error = %e,
                    event = "session_corrupt",
                    "Stored session could not be parsed, purging"
                );
                self.purge().await;
                return Ok(None);
            }
        };

        if !session.is_valid_at(now) {
            tracing::info!(
                key = %self.key,
                user_id = %session.user.id,
                expires_at = %session.expires_at,
                event = "session_expired",
                "Stored session expired, purging"
            );
            self.purge().await;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Persist `session`, replacing whatever was stored
    pub async fn write(&self, session: &CustomSession) -> DomainResult<()> {
        let raw = serde_json::to_string(session).map_err(|e| DomainError::Internal {
            message: format!("Failed to serialize session: {}", e),
        })?;
        let ttl = (session.expires_at - Utc::now()).to_std().ok();

        self.storage.set(&self.key, raw, ttl).await?;

        tracing::debug!(
            key = %self.key,
            phone = %mask_phone_number(&session.user.phone_number),
            expires_at = %session.expires_at,
            "Persisted custom session"
        );
        Ok(())
    }

    /// Remove the persisted session
    pub async fn clear(&self) -> DomainResult<()> {
        self.storage.remove(&self.key).await
    }

    /// Build (without persisting) a session for `user` with the configured lifetime
    pub fn create_for(&self, user: UserData) -> CustomSession {
        self.create_for_at(user, Utc::now())
    }

    pub fn create_for_at(&self, user: UserData, now: DateTime<Utc>) -> CustomSession {
        CustomSession::new(user, now, self.ttl)
    }

    async fn purge(&self) {
        if let Err(e) = self.storage.remove(&self.key).await {
            tracing::warn!(key = %self.key, error = %e, "Failed to purge stored session");
        }
    }
}
