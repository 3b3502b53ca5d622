//! Client session module
//!
//! This module keeps the signed-in state of one client consistent across
//! two session sources:
//! - The custom session persisted after a code verification (`userSession`)
//! - The managed auth provider's own session and its event stream
//!
//! [`AuthCoordinator`] reconciles both and publishes an [`AuthSnapshot`];
//! [`RouteGuard`] uses it to admit or redirect navigation into `/portal`.

mod coordinator;
mod guard;
mod mock;
mod provider;
mod storage;
mod store;

#[cfg(test)]
mod tests;

pub use coordinator::{AuthCoordinator, AuthPhase, AuthSnapshot, RefreshOutcome, SkipReason};
pub use guard::{is_public_path, requires_auth, GuardDecision, RouteGuard, LOGIN_PATH};
pub use mock::MockManagedAuth;
pub use provider::{AuthEvent, AuthStateChange, ManagedAuth};
pub use storage::{InMemorySessionStorage, SessionStorage};
pub use store::{SessionStore, DEFAULT_SESSION_KEY, DEFAULT_SESSION_TTL_DAYS};
