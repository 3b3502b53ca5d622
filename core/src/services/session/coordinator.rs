//! Auth coordinator reconciling the custom session with the provider session

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use pf_shared::utils::phone::mask_phone_number;

use crate::domain::entities::session::{RemoteSession, SessionSource, UserData};
use crate::errors::{AuthError, DomainResult};

use super::provider::{AuthEvent, AuthStateChange, ManagedAuth};
use super::storage::SessionStorage;
use super::store::SessionStore;

/// Coarse lifecycle state derived from an [`AuthSnapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Uninitialized,
    Loading,
    Refreshing,
    Authenticated,
    Unauthenticated,
}

/// Read model published to observers on every change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    session: Option<SessionSource>,
    initialized: bool,
    refreshing: bool,
    pending: u32,
}

impl AuthSnapshot {
    pub fn session(&self) -> Option<&SessionSource> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Option<&UserData> {
        self.session.as_ref().map(SessionSource::user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// True while init, refresh or sign-out is running
    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// Initialized and no operation in flight
    pub fn is_settled(&self) -> bool {
        self.initialized && !self.is_loading() && !self.refreshing
    }

    pub fn phase(&self) -> AuthPhase {
        if self.refreshing {
            AuthPhase::Refreshing
        } else if self.is_loading() {
            AuthPhase::Loading
        } else if !self.initialized {
            AuthPhase::Uninitialized
        } else if self.session.is_some() {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Unauthenticated
        }
    }
}

/// Why a refresh request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotInitialized,
    InFlight,
}

/// Definitive result of [`AuthCoordinator::refresh_session`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Authenticated(SessionSource),
    Unauthenticated,
    Skipped(SkipReason),
}

/// Holds the loading flag up for as long as it lives
struct LoadingGuard<'a> {
    state: &'a watch::Sender<AuthSnapshot>,
}

impl<'a> LoadingGuard<'a> {
    fn enter(state: &'a watch::Sender<AuthSnapshot>) -> Self {
        state.send_modify(|s| s.pending += 1);
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .send_modify(|s| s.pending = s.pending.saturating_sub(1));
    }
}

/// Releases the refresh flag when dropped
struct RefreshGuard<'a> {
    flag: &'a AtomicBool,
    state: &'a watch::Sender<AuthSnapshot>,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        self.state.send_modify(|s| s.refreshing = false);
    }
}

/// Single source of truth for the client's signed-in state
///
/// Constructed once, shared by `Arc`, started with [`init`](Self::init) and
/// stopped with [`dispose`](Self::dispose).
pub struct AuthCoordinator<S: SessionStorage, P: ManagedAuth> {
    store: SessionStore<S>,
    provider: Arc<P>,
    state: watch::Sender<AuthSnapshot>,
    initialized: AtomicBool,
    initializing: AtomicBool,
    refreshing: AtomicBool,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl<S, P> AuthCoordinator<S, P>
where
    S: SessionStorage + 'static,
    P: ManagedAuth + 'static,
{
    pub fn new(store: SessionStore<S>, provider: Arc<P>) -> Arc<Self> {
        let (state, _) = watch::channel(AuthSnapshot::default());
        Arc::new(Self {
            store,
            provider,
            state,
            initialized: AtomicBool::new(false),
            initializing: AtomicBool::new(false),
            refreshing: AtomicBool::new(false),
            listener: Mutex::new(None),
        })
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    /// Current read model
    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    /// Load the persisted session, start listening to the provider and
    /// fetch the provider session once
    ///
    /// Calling it again after the first successful run does nothing. A call
    /// made while another is running waits for that run instead.
    pub async fn init(self: &Arc<Self>) {
        if self.initialized.load(Ordering::SeqCst) {
            return;
        }
        if self
            .initializing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Init already running, waiting for it");
            let mut rx = self.state.subscribe();
            let _ = rx.wait_for(AuthSnapshot::is_initialized).await;
            return;
        }
        let _loading = LoadingGuard::enter(&self.state);

        match self.store.read().await {
            Ok(Some(session)) => {
                tracing::info!(
                    user_id = %session.user.id,
                    event = "session_restored",
                    "Using persisted custom session"
                );
                self.adopt(session.into());
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read persisted session"),
        }

        self.spawn_listener();

        match self.provider.get_session().await.map(|s| s.and_then(live_remote)) {
            Ok(Some(remote)) => {
                tracing::info!(
                    user_id = %remote.user.id,
                    event = "provider_session_found",
                    "Using provider session"
                );
                self.adopt(remote.into());
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to fetch provider session"),
        }

        self.initialized.store(true, Ordering::SeqCst);
        self.state.send_modify(|s| s.initialized = true);
    }

    /// Stop listening to provider events; in-flight calls are not cancelled
    pub fn dispose(&self) {
        let handle = match self.listener.lock() {
            Ok(mut listener) => listener.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
            tracing::debug!("Auth event listener stopped");
        }
    }

    /// Apply one provider state change
    pub async fn handle_auth_event(&self, change: AuthStateChange) {
        tracing::debug!(event = ?change.event, "Auth state change received");

        if let Some(remote) = change.session.and_then(live_remote) {
            self.adopt(remote.into());
            return;
        }

        if change.event == AuthEvent::SignedOut {
            if let Err(e) = self.store.clear().await {
                tracing::warn!(error = %e, "Failed to remove persisted session on sign-out");
            }
            self.clear_session();
            return;
        }

        match self.store.read().await {
            Ok(Some(session)) => self.adopt(session.into()),
            Ok(None) => self.clear_session(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted session after event");
                self.clear_session();
            }
        }
    }

    /// Re-resolve the session: persisted custom session first, then the
    /// provider
    ///
    /// Returns `Skipped` before `init` has completed or while another refresh
    /// is running.
    pub async fn refresh_session(&self) -> RefreshOutcome {
        if !self.initialized.load(Ordering::SeqCst) {
            return RefreshOutcome::Skipped(SkipReason::NotInitialized);
        }
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Refresh already in flight, skipping");
            return RefreshOutcome::Skipped(SkipReason::InFlight);
        }

        self.state.send_modify(|s| s.refreshing = true);
        let _refresh = RefreshGuard {
            flag: &self.refreshing,
            state: &self.state,
        };
        let _loading = LoadingGuard::enter(&self.state);

        match self.store.read().await {
            Ok(Some(session)) => {
                let session = SessionSource::Local(session);
                self.adopt(session.clone());
                return RefreshOutcome::Authenticated(session);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read persisted session during refresh"),
        }

        match self.provider.get_session().await.map(|s| s.and_then(live_remote)) {
            Ok(Some(remote)) => {
                let session = SessionSource::Remote(remote);
                self.adopt(session.clone());
                RefreshOutcome::Authenticated(session)
            }
            Ok(None) => {
                tracing::info!(event = "session_missing", "No custom or provider session found");
                self.clear_session();
                RefreshOutcome::Unauthenticated
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch provider session during refresh");
                self.clear_session();
                RefreshOutcome::Unauthenticated
            }
        }
    }

    /// Sign out of both session sources
    ///
    /// On provider failure the persisted session is already gone and an
    /// in-memory custom session is dropped, but a provider session stays
    /// adopted because the user is still signed in remotely.
    pub async fn sign_out(&self) -> DomainResult<()> {
        let _loading = LoadingGuard::enter(&self.state);

        if let Err(e) = self.store.clear().await {
            tracing::warn!(error = %e, "Failed to remove persisted session");
        }

        match self.provider.sign_out().await {
            Ok(()) => {
                self.clear_session();
                tracing::info!(event = "signed_out", "Signed out");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, event = "sign_out_failed", "Provider sign-out failed");
                let drop_local = self
                    .state
                    .borrow()
                    .session
                    .as_ref()
                    .map_or(false, SessionSource::is_local);
                if drop_local {
                    self.clear_session();
                }
                Err(AuthError::SignOutFailed {
                    message: e.to_string(),
                }
                .into())
            }
        }
    }

    /// Persist and adopt a custom session for a freshly verified user
    pub async fn establish_session(&self, user: UserData) -> DomainResult<SessionSource> {
        let session = self.store.create_for(user);
        self.store.write(&session).await?;

        tracing::info!(
            phone = %mask_phone_number(&session.user.phone_number),
            expires_at = %session.expires_at,
            event = "session_established",
            "Custom session created"
        );

        let session = SessionSource::Local(session);
        self.adopt(session.clone());
        Ok(session)
    }

    /// Wait until initialized with nothing in flight
    pub async fn wait_until_settled(&self) -> AuthSnapshot {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close while borrowed
        let settled = match rx.wait_for(AuthSnapshot::is_settled).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        };
        settled
    }

    fn adopt(&self, session: SessionSource) {
        self.state.send_modify(|s| s.session = Some(session));
    }

    fn clear_session(&self) {
        self.state.send_if_modified(|s| s.session.take().is_some());
    }

    fn spawn_listener(self: &Arc<Self>) {
        let rx = self.provider.subscribe();
        let handle = tokio::spawn(listen(Arc::downgrade(self), rx));

        let previous = match self.listener.lock() {
            Ok(mut listener) => listener.replace(handle),
            Err(poisoned) => poisoned.into_inner().replace(handle),
        };
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

/// Keep a provider session only while its expiry is strictly ahead
fn live_remote(remote: RemoteSession) -> Option<RemoteSession> {
    if remote.is_valid_at(Utc::now()) {
        return Some(remote);
    }
    tracing::info!(
        user_id = %remote.user.id,
        expires_at = %remote.expires_at,
        event = "provider_session_expired",
        "Ignoring expired provider session"
    );
    None
}

async fn listen<S, P>(
    coordinator: Weak<AuthCoordinator<S, P>>,
    mut rx: broadcast::Receiver<AuthStateChange>,
) where
    S: SessionStorage + 'static,
    P: ManagedAuth + 'static,
{
    loop {
        match rx.recv().await {
            Ok(change) => {
                let Some(coordinator) = coordinator.upgrade() else {
                    break;
                };
                coordinator.handle_auth_event(change).await;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Auth event listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
