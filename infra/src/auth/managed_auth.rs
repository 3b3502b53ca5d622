//! HTTP client for the managed auth provider
//!
//! Talks to a GoTrue-compatible API under `{url}/auth/v1`. The client holds
//! at most one provider session; [`ManagedAuth::get_session`] validates it
//! against the provider and refreshes it when the access token has expired.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};

use pf_core::domain::entities::session::RemoteSession;
use pf_core::errors::{DomainError, DomainResult};
use pf_core::services::session::{AuthEvent, AuthStateChange, ManagedAuth};
use pf_shared::config::ManagedAuthConfig;

use super::types::{ProviderErrorBody, ProviderUser, RefreshTokenRequest, TokenResponse};
use crate::InfrastructureError;

const EVENT_CAPACITY: usize = 64;

fn provider_error(e: InfrastructureError) -> DomainError {
    DomainError::Provider {
        message: e.to_string(),
    }
}

/// What the provider said about the token we presented
enum TokenCheck {
    Valid(ProviderUser),
    Rejected,
}

/// [`ManagedAuth`] backed by the provider's REST API
pub struct HttpManagedAuth {
    client: Client,
    config: ManagedAuthConfig,
    session: RwLock<Option<RemoteSession>>,
    events: broadcast::Sender<AuthStateChange>,
}

impl HttpManagedAuth {
    pub fn new(config: ManagedAuthConfig) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            client,
            config,
            session: RwLock::new(None),
            events,
        })
    }

    pub fn config(&self) -> &ManagedAuthConfig {
        &self.config
    }

    /// Adopt a session obtained elsewhere and announce `SignedIn`
    pub async fn set_session(&self, session: RemoteSession) {
        tracing::info!(
            user_id = %session.user.id,
            expires_at = %session.expires_at,
            event = "provider_signed_in",
            "Provider session set"
        );
        *self.session.write().await = Some(session.clone());
        self.emit(AuthEvent::SignedIn, Some(session));
    }

    /// Exchange a refresh token for a new session and announce `SignedIn`
    pub async fn sign_in_with_refresh_token(&self, refresh_token: &str) -> DomainResult<RemoteSession> {
        let session = self
            .exchange_refresh_token(refresh_token)
            .await
            .map_err(provider_error)?
            .ok_or_else(|| DomainError::Provider {
                message: "refresh token rejected".to_string(),
            })?;
        self.set_session(session.clone()).await;
        Ok(session)
    }

    fn emit(&self, event: AuthEvent, session: Option<RemoteSession>) {
        // No receivers is fine
        let _ = self.events.send(AuthStateChange::new(event, session));
    }

    /// `GET /user` with the access token
    async fn check_token(&self, access_token: &str) -> Result<TokenCheck, InfrastructureError> {
        let response = self
            .client
            .get(self.config.auth_endpoint("user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(TokenCheck::Valid(response.json().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(TokenCheck::Rejected),
            _ => Err(Self::unexpected(response).await),
        }
    }

    /// `POST /token?grant_type=refresh_token`; `None` when the token is refused
    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<RemoteSession>, InfrastructureError> {
        let response = self
            .client
            .post(self.config.auth_endpoint("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.config.anon_key)
            .json(&RefreshTokenRequest { refresh_token })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let token: TokenResponse = response.json().await?;
            return Ok(Some(token.into_session(Utc::now())));
        }
        if status.is_client_error() {
            let body: ProviderErrorBody = response.json().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                reason = body.describe().unwrap_or("unknown"),
                "Refresh token refused"
            );
            return Ok(None);
        }
        Err(Self::unexpected(response).await)
    }

    async fn unexpected(response: Response) -> InfrastructureError {
        let status = response.status();
        let body: ProviderErrorBody = response.json().await.unwrap_or_default();
        InfrastructureError::General(format!(
            "auth provider returned {}: {}",
            status,
            body.describe().unwrap_or("no details")
        ))
    }

    /// Refresh `current`, updating the held session
    ///
    /// A refused refresh drops the session and announces `SignedOut`.
    async fn refresh(&self, current: &RemoteSession) -> DomainResult<Option<RemoteSession>> {
        let Some(refresh_token) = current.refresh_token.as_deref() else {
            tracing::info!(user_id = %current.user.id, "Provider session expired without refresh token");
            self.drop_session().await;
            return Ok(None);
        };

        match self
            .exchange_refresh_token(refresh_token)
            .await
            .map_err(provider_error)?
        {
            Some(session) => {
                tracing::info!(
                    user_id = %session.user.id,
                    expires_at = %session.expires_at,
                    event = "provider_token_refreshed",
                    "Provider session refreshed"
                );
                *self.session.write().await = Some(session.clone());
                self.emit(AuthEvent::TokenRefreshed, Some(session.clone()));
                Ok(Some(session))
            }
            None => {
                self.drop_session().await;
                Ok(None)
            }
        }
    }

    async fn drop_session(&self) {
        if self.session.write().await.take().is_some() {
            self.emit(AuthEvent::SignedOut, None);
        }
    }
}

#[async_trait]
impl ManagedAuth for HttpManagedAuth {
    async fn get_session(&self) -> DomainResult<Option<RemoteSession>> {
        let Some(current) = self.session.read().await.clone() else {
            return Ok(None);
        };

        if !current.is_valid_at(Utc::now()) {
            return self.refresh(&current).await;
        }

        match self
            .check_token(&current.access_token)
            .await
            .map_err(provider_error)?
        {
            TokenCheck::Valid(user) => {
                let user = user.to_user_data();
                if user == current.user {
                    return Ok(Some(current));
                }
                let updated = RemoteSession { user, ..current };
                *self.session.write().await = Some(updated.clone());
                self.emit(AuthEvent::UserUpdated, Some(updated.clone()));
                Ok(Some(updated))
            }
            TokenCheck::Rejected => {
                tracing::debug!(user_id = %current.user.id, "Access token rejected, refreshing");
                self.refresh(&current).await
            }
        }
    }

    async fn sign_out(&self) -> DomainResult<()> {
        let current = self.session.read().await.clone();

        if let Some(current) = current {
            let response = self
                .client
                .post(self.config.auth_endpoint("logout"))
                .header("apikey", &self.config.anon_key)
                .bearer_auth(&current.access_token)
                .send()
                .await
                .map_err(|e| provider_error(e.into()))?;

            let status = response.status();
            // An already invalid token means there is nothing left to revoke
            if !status.is_success()
                && status != StatusCode::UNAUTHORIZED
                && status != StatusCode::NOT_FOUND
            {
                return Err(provider_error(Self::unexpected(response).await));
            }
        }

        *self.session.write().await = None;
        self.emit(AuthEvent::SignedOut, None);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use pf_core::domain::entities::session::UserData;
    use uuid::Uuid;

    /// Nothing listens here, so any request fails fast
    fn offline_auth() -> HttpManagedAuth {
        let mut config = ManagedAuthConfig::new("http://127.0.0.1:9", "anon");
        config.request_timeout = 2;
        HttpManagedAuth::new(config).unwrap()
    }

    fn remote_session(expires_in: ChronoDuration, refresh_token: Option<&str>) -> RemoteSession {
        RemoteSession {
            access_token: "access".to_string(),
            refresh_token: refresh_token.map(str::to_string),
            expires_at: Utc::now() + expires_in,
            user: UserData {
                id: Uuid::new_v4(),
                phone_number: "56912345678".to_string(),
                name: None,
                email: None,
            },
        }
    }

    #[tokio::test]
    async fn test_no_session_needs_no_request() {
        let auth = offline_auth();
        assert_eq!(auth.get_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_session_announces_sign_in() {
        let auth = offline_auth();
        let mut rx = auth.subscribe();
        let session = remote_session(ChronoDuration::hours(1), None);

        auth.set_session(session.clone()).await;

        let change = rx.recv().await.unwrap();
        assert_eq!(change.event, AuthEvent::SignedIn);
        assert_eq!(change.session, Some(session));
    }

    #[tokio::test]
    async fn test_expired_session_without_refresh_token_is_dropped() {
        let auth = offline_auth();
        auth.set_session(remote_session(ChronoDuration::seconds(-5), None))
            .await;
        let mut rx = auth.subscribe();

        assert_eq!(auth.get_session().await.unwrap(), None);
        assert_eq!(rx.recv().await.unwrap().event, AuthEvent::SignedOut);
        assert_eq!(auth.get_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_a_provider_error() {
        let auth = offline_auth();
        auth.set_session(remote_session(ChronoDuration::hours(1), Some("r")))
            .await;

        let result = auth.get_session().await;
        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_failed_sign_out_keeps_session() {
        let auth = offline_auth();
        let session = remote_session(ChronoDuration::hours(1), None);
        auth.set_session(session.clone()).await;

        assert!(auth.sign_out().await.is_err());
        assert_eq!(auth.session.read().await.clone(), Some(session));
    }

    #[tokio::test]
    async fn test_sign_out_without_session_still_announces() {
        let auth = offline_auth();
        let mut rx = auth.subscribe();

        auth.sign_out().await.unwrap();
        assert_eq!(rx.recv().await.unwrap().event, AuthEvent::SignedOut);
    }

    #[test]
    fn test_endpoints() {
        let auth = offline_auth();
        assert_eq!(
            auth.config().auth_endpoint("token"),
            "http://127.0.0.1:9/auth/v1/token"
        );
    }
}
