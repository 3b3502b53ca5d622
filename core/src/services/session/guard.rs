//! Route guard for the authenticated `/portal` area

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::coordinator::{AuthCoordinator, AuthSnapshot, RefreshOutcome};
use super::provider::ManagedAuth;
use super::storage::SessionStorage;

/// Where unauthenticated visitors are sent
pub const LOGIN_PATH: &str = "/login";

const PROTECTED_PREFIX: &str = "/portal";

const PUBLIC_PATHS: &[&str] = &["/", "/signin", "/register", "/login", "/scan"];

/// Whether `path` lies in the protected area
pub fn requires_auth(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path == PROTECTED_PREFIX
        || path
            .strip_prefix(PROTECTED_PREFIX)
            .map_or(false, |rest| rest.starts_with('/'))
}

/// Whether `path` is one of the public pages (`/pet/{id}` included)
pub fn is_public_path(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    PUBLIC_PATHS.contains(&path)
        || path
            .strip_prefix("/pet/")
            .map_or(false, |id| !id.is_empty() && !id.contains('/'))
}

/// What the router should do with a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth state unresolved; show a placeholder
    Loading,
    Admit,
    /// Send to `to`, keeping the requested location in `from`
    Redirect { to: String, from: String },
}

impl GuardDecision {
    fn redirect(from: &str) -> Self {
        GuardDecision::Redirect {
            to: LOGIN_PATH.to_string(),
            from: from.to_string(),
        }
    }
}

/// Per-mount guard; triggers at most one refresh over its lifetime
pub struct RouteGuard<S: SessionStorage, P: ManagedAuth> {
    coordinator: Arc<AuthCoordinator<S, P>>,
    refresh_attempted: AtomicBool,
}

impl<S, P> RouteGuard<S, P>
where
    S: SessionStorage + 'static,
    P: ManagedAuth + 'static,
{
    pub fn new(coordinator: Arc<AuthCoordinator<S, P>>) -> Self {
        Self {
            coordinator,
            refresh_attempted: AtomicBool::new(false),
        }
    }

    pub fn refresh_attempted(&self) -> bool {
        self.refresh_attempted.load(Ordering::SeqCst)
    }

    /// Decide from the current snapshot without waiting
    pub fn evaluate(&self, location: &str) -> GuardDecision {
        if !requires_auth(location) {
            return GuardDecision::Admit;
        }
        self.decide(location, &self.coordinator.snapshot())
    }

    /// Wait for a definitive decision
    ///
    /// Waits for the coordinator to settle, then triggers one refresh if the
    /// user is unauthenticated and this guard has not refreshed before.
    pub async fn resolve(&self, location: &str) -> GuardDecision {
        if !requires_auth(location) {
            return GuardDecision::Admit;
        }

        let snapshot = self.coordinator.wait_until_settled().await;
        if snapshot.is_authenticated() {
            return GuardDecision::Admit;
        }

        if self.refresh_attempted.swap(true, Ordering::SeqCst) {
            tracing::debug!(location, "Refresh already attempted, redirecting");
            return GuardDecision::redirect(location);
        }

        tracing::debug!(location, "Not authenticated, refreshing session");
        let authenticated = match self.coordinator.refresh_session().await {
            RefreshOutcome::Authenticated(_) => true,
            RefreshOutcome::Unauthenticated => false,
            RefreshOutcome::Skipped(reason) => {
                tracing::debug!(?reason, "Refresh skipped, waiting for the running one");
                self.coordinator
                    .wait_until_settled()
                    .await
                    .is_authenticated()
            }
        };

        if authenticated {
            GuardDecision::Admit
        } else {
            tracing::info!(location, event = "guard_redirect", "Access denied, redirecting to login");
            GuardDecision::redirect(location)
        }
    }

    fn decide(&self, location: &str, snapshot: &AuthSnapshot) -> GuardDecision {
        if !snapshot.is_settled() {
            GuardDecision::Loading
        } else if snapshot.is_authenticated() {
            GuardDecision::Admit
        } else if self.refresh_attempted() {
            GuardDecision::redirect(location)
        } else {
            GuardDecision::Loading
        }
    }
}
