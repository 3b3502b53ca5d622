//! Business services containing domain logic and use cases.

pub mod session;
pub mod verification;

// Re-export commonly used types
pub use session::{
    AuthCoordinator, AuthEvent, AuthPhase, AuthSnapshot, AuthStateChange, GuardDecision,
    InMemorySessionStorage, ManagedAuth, MockManagedAuth, RefreshOutcome, RouteGuard,
    SessionStorage, SessionStore, SkipReason,
};
pub use verification::{IssuedCode, VerificationService, VerificationServiceConfig};
