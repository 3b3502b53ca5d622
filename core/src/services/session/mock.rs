//! In-memory managed auth provider for tests and offline runs

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};

use crate::domain::entities::session::RemoteSession;
use crate::errors::{DomainError, DomainResult};

use super::provider::{AuthEvent, AuthStateChange, ManagedAuth};

const EVENT_CAPACITY: usize = 64;

/// Mock provider holding a single session
///
/// Calls can be delayed with `with_latency` so tests can interleave them.
pub struct MockManagedAuth {
    session: RwLock<Option<RemoteSession>>,
    events: broadcast::Sender<AuthStateChange>,
    latency: Duration,
    get_session_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
    fail_get_session: AtomicBool,
    fail_sign_out: AtomicBool,
}

impl MockManagedAuth {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            session: RwLock::new(None),
            events,
            latency: Duration::ZERO,
            get_session_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            fail_get_session: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
        }
    }

    /// Delay every provider call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Replace the held session without emitting an event
    pub async fn set_session(&self, session: Option<RemoteSession>) {
        *self.session.write().await = session;
    }

    /// Broadcast a state change to subscribers
    pub fn emit(&self, change: AuthStateChange) -> usize {
        self.events.send(change).unwrap_or(0)
    }

    pub fn get_session_calls(&self) -> usize {
        self.get_session_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    pub fn fail_get_session(&self, fail: bool) {
        self.fail_get_session.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for MockManagedAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ManagedAuth for MockManagedAuth {
    async fn get_session(&self) -> DomainResult<Option<RemoteSession>> {
        self.get_session_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;

        if self.fail_get_session.load(Ordering::SeqCst) {
            return Err(DomainError::Provider {
                message: "simulated get_session failure".to_string(),
            });
        }
        Ok(self.session.read().await.clone())
    }

    async fn sign_out(&self) -> DomainResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;

        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(DomainError::Provider {
                message: "simulated sign_out failure".to_string(),
            });
        }

        *self.session.write().await = None;
        self.emit(AuthStateChange::new(AuthEvent::SignedOut, None));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange> {
        self.events.subscribe()
    }
}
