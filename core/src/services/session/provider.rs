//! Managed auth provider interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::domain::entities::session::RemoteSession;
use crate::errors::DomainResult;

/// Auth state events emitted by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

/// One provider state change, with the session current after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStateChange {
    pub event: AuthEvent,
    pub session: Option<RemoteSession>,
}

impl AuthStateChange {
    pub fn new(event: AuthEvent, session: Option<RemoteSession>) -> Self {
        Self { event, session }
    }
}

/// Client of the managed auth provider
#[async_trait]
pub trait ManagedAuth: Send + Sync {
    /// Current provider session, if any
    async fn get_session(&self) -> DomainResult<Option<RemoteSession>>;

    /// End the provider session
    async fn sign_out(&self) -> DomainResult<()>;

    /// Stream of state changes emitted after the call
    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange>;
}
