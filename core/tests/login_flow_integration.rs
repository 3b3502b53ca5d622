//! End-to-end login flow: issue a code, verify it, establish the session and
//! pass the portal guard.

use std::sync::Arc;

use pf_core::errors::{AuthError, DomainError};
use pf_core::repositories::MockUserRepository;
use pf_core::services::session::{
    AuthCoordinator, GuardDecision, InMemorySessionStorage, MockManagedAuth, RouteGuard,
    SessionStore,
};
use pf_core::services::verification::{VerificationService, VerificationServiceConfig};

#[tokio::test]
async fn test_phone_login_reaches_portal() {
    let repo = Arc::new(MockUserRepository::new());
    let verification = VerificationService::new(repo.clone(), VerificationServiceConfig::default());

    let storage = Arc::new(InMemorySessionStorage::new());
    let coordinator = AuthCoordinator::new(
        SessionStore::new(storage.clone()),
        Arc::new(MockManagedAuth::new()),
    );
    coordinator.init().await;

    let before = RouteGuard::new(coordinator.clone());
    assert!(matches!(
        before.resolve("/portal").await,
        GuardDecision::Redirect { .. }
    ));

    let issued = verification.issue_code("+56 9 1234 5678").await.unwrap();
    let user = verification
        .verify_code(&format!("+{}", issued.phone_number), &issued.security_code)
        .await
        .unwrap();
    coordinator.establish_session(user.clone()).await.unwrap();

    let after = RouteGuard::new(coordinator.clone());
    assert_eq!(after.resolve("/portal/pets").await, GuardDecision::Admit);
    assert_eq!(coordinator.snapshot().user(), Some(&user));

    // A restarted client restores the session from storage alone
    let restarted = AuthCoordinator::new(SessionStore::new(storage), Arc::new(MockManagedAuth::new()));
    restarted.init().await;
    assert_eq!(restarted.snapshot().user(), Some(&user));

    let replay = verification
        .verify_code(&issued.phone_number, &issued.security_code)
        .await;
    assert!(matches!(replay, Err(DomainError::Auth(AuthError::IncorrectCode))));
}

#[tokio::test]
async fn test_sign_out_returns_to_login() {
    let storage = Arc::new(InMemorySessionStorage::new());
    let coordinator = AuthCoordinator::new(
        SessionStore::new(storage),
        Arc::new(MockManagedAuth::new()),
    );
    coordinator.init().await;

    let repo = Arc::new(MockUserRepository::new());
    let verification = VerificationService::new(repo, VerificationServiceConfig::default());
    let issued = verification.issue_code("912345678").await.unwrap();
    let user = verification
        .verify_code(&issued.phone_number, &issued.security_code)
        .await
        .unwrap();
    coordinator.establish_session(user).await.unwrap();

    coordinator.sign_out().await.unwrap();

    let guard = RouteGuard::new(coordinator);
    assert_eq!(
        guard.resolve("/portal").await,
        GuardDecision::Redirect {
            to: "/login".to_string(),
            from: "/portal".to_string(),
        }
    );
}
