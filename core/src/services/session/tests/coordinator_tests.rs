//! Unit tests for the auth coordinator

use chrono::Duration;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use crate::domain::entities::session::SessionSource;
use crate::errors::{AuthError, DomainError};
use crate::services::session::{
    AuthCoordinator, AuthEvent, AuthPhase, AuthStateChange, InMemorySessionStorage,
    MockManagedAuth, RefreshOutcome, SessionStore, SkipReason, DEFAULT_SESSION_KEY,
};

use super::{custom_session, remote_session, remote_session_valid_for, sample_user};

type Coordinator = AuthCoordinator<InMemorySessionStorage, MockManagedAuth>;

fn setup(
    provider: MockManagedAuth,
) -> (Arc<Coordinator>, Arc<InMemorySessionStorage>, Arc<MockManagedAuth>) {
    let storage = Arc::new(InMemorySessionStorage::new());
    let provider = Arc::new(provider);
    let coordinator = AuthCoordinator::new(SessionStore::new(storage.clone()), provider.clone());
    (coordinator, storage, provider)
}

#[tokio::test]
async fn test_snapshot_before_init() {
    let (coordinator, _, _) = setup(MockManagedAuth::new());

    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.phase(), AuthPhase::Uninitialized);
    assert!(!snapshot.is_authenticated());
    assert!(!snapshot.is_loading());
}

#[tokio::test]
async fn test_init_adopts_persisted_session() {
    let (coordinator, _, _) = setup(MockManagedAuth::new());
    let session = custom_session(Duration::days(1));
    coordinator.store().write(&session).await.unwrap();

    coordinator.init().await;

    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.phase(), AuthPhase::Authenticated);
    assert_eq!(snapshot.session(), Some(&SessionSource::Local(session.clone())));
    assert_eq!(snapshot.user(), Some(&session.user));
}

#[tokio::test]
async fn test_init_purges_expired_session() {
    let (coordinator, storage, _) = setup(MockManagedAuth::new());
    coordinator
        .store()
        .write(&custom_session(Duration::seconds(-5)))
        .await
        .unwrap();

    coordinator.init().await;

    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.phase(), AuthPhase::Unauthenticated);
    assert!(!snapshot.is_authenticated());
    assert!(storage.peek(DEFAULT_SESSION_KEY).await.is_none());
}

#[tokio::test]
async fn test_init_adopts_provider_session() {
    let provider = MockManagedAuth::new();
    let remote = remote_session();
    provider.set_session(Some(remote.clone())).await;
    let (coordinator, _, provider) = setup(provider);

    coordinator.init().await;

    assert_eq!(
        coordinator.snapshot().session(),
        Some(&SessionSource::Remote(remote))
    );
    assert_eq!(provider.get_session_calls(), 1);
}

#[tokio::test]
async fn test_init_ignores_expired_provider_session() {
    let provider = MockManagedAuth::new();
    provider
        .set_session(Some(remote_session_valid_for(Duration::seconds(-1))))
        .await;
    let (coordinator, _, _) = setup(provider);

    coordinator.init().await;

    let snapshot = coordinator.snapshot();
    assert!(snapshot.is_initialized());
    assert!(!snapshot.is_authenticated());
    assert_eq!(snapshot.phase(), AuthPhase::Unauthenticated);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_init_runs_once() {
    let (coordinator, storage, provider) =
        setup(MockManagedAuth::new().with_latency(StdDuration::from_millis(50)));
    let mut events = coordinator.subscribe();

    tokio::join!(coordinator.init(), coordinator.init());

    assert_eq!(provider.get_session_calls(), 1);
    assert_eq!(storage.read_count(), 1);
    assert!(coordinator.snapshot().is_settled());

    // A single listener is running
    provider.emit(AuthStateChange::new(AuthEvent::SignedIn, Some(remote_session())));
    events
        .wait_for(|s| s.is_authenticated())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_init_tolerates_provider_failure() {
    let (coordinator, _, provider) = setup(MockManagedAuth::new());
    provider.fail_get_session(true);

    coordinator.init().await;

    let snapshot = coordinator.snapshot();
    assert!(snapshot.is_initialized());
    assert_eq!(snapshot.phase(), AuthPhase::Unauthenticated);
}

#[tokio::test]
async fn test_refresh_before_init_is_skipped() {
    let (coordinator, storage, provider) = setup(MockManagedAuth::new());

    let outcome = coordinator.refresh_session().await;

    assert_eq!(outcome, RefreshOutcome::Skipped(SkipReason::NotInitialized));
    assert_eq!(storage.read_count(), 0);
    assert_eq!(provider.get_session_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_refresh_runs_one_cycle() {
    let (coordinator, storage, provider) =
        setup(MockManagedAuth::new().with_latency(StdDuration::from_millis(50)));
    coordinator.init().await;
    let reads = storage.read_count();
    let calls = provider.get_session_calls();

    let (first, second) = tokio::join!(coordinator.refresh_session(), coordinator.refresh_session());

    assert_eq!(first, RefreshOutcome::Unauthenticated);
    assert_eq!(second, RefreshOutcome::Skipped(SkipReason::InFlight));
    assert_eq!(storage.read_count() - reads, 1);
    assert_eq!(provider.get_session_calls() - calls, 1);

    let snapshot = coordinator.snapshot();
    assert!(!snapshot.is_loading());
    assert!(!snapshot.is_refreshing());
}

#[tokio::test]
async fn test_refresh_prefers_persisted_session() {
    let provider = MockManagedAuth::new();
    provider.set_session(Some(remote_session())).await;
    let (coordinator, _, provider) = setup(provider);
    coordinator.init().await;

    let session = custom_session(Duration::days(1));
    coordinator.store().write(&session).await.unwrap();
    let calls = provider.get_session_calls();

    let outcome = coordinator.refresh_session().await;

    assert_eq!(outcome, RefreshOutcome::Authenticated(SessionSource::Local(session)));
    assert_eq!(provider.get_session_calls(), calls);
}

#[tokio::test]
async fn test_refresh_falls_back_to_provider() {
    let (coordinator, _, provider) = setup(MockManagedAuth::new());
    coordinator.init().await;
    let remote = remote_session();
    provider.set_session(Some(remote.clone())).await;

    let outcome = coordinator.refresh_session().await;

    assert_eq!(outcome, RefreshOutcome::Authenticated(SessionSource::Remote(remote)));
    assert_eq!(coordinator.snapshot().phase(), AuthPhase::Authenticated);
}

#[tokio::test]
async fn test_refresh_rejects_expired_provider_session() {
    let (coordinator, _, provider) = setup(MockManagedAuth::new());
    coordinator.init().await;
    provider
        .set_session(Some(remote_session_valid_for(Duration::seconds(-1))))
        .await;

    let outcome = coordinator.refresh_session().await;

    assert_eq!(outcome, RefreshOutcome::Unauthenticated);
    assert!(!coordinator.snapshot().is_authenticated());
}

#[tokio::test]
async fn test_refresh_releases_flags_on_provider_error() {
    let (coordinator, _, provider) = setup(MockManagedAuth::new());
    coordinator.init().await;
    provider.fail_get_session(true);

    assert_eq!(coordinator.refresh_session().await, RefreshOutcome::Unauthenticated);

    let snapshot = coordinator.snapshot();
    assert!(!snapshot.is_loading());
    assert!(!snapshot.is_refreshing());

    provider.fail_get_session(false);
    provider.set_session(Some(remote_session())).await;
    assert!(matches!(
        coordinator.refresh_session().await,
        RefreshOutcome::Authenticated(SessionSource::Remote(_))
    ));
}

#[tokio::test]
async fn test_event_with_session_overrides_custom_session() {
    let (coordinator, storage, _) = setup(MockManagedAuth::new());
    coordinator.establish_session(sample_user()).await.unwrap();
    let remote = remote_session();

    coordinator
        .handle_auth_event(AuthStateChange::new(AuthEvent::SignedIn, Some(remote.clone())))
        .await;

    assert_eq!(
        coordinator.snapshot().session(),
        Some(&SessionSource::Remote(remote))
    );
    assert!(storage.peek(DEFAULT_SESSION_KEY).await.is_some());
}

#[tokio::test]
async fn test_event_with_expired_session_falls_back_to_custom_session() {
    let (coordinator, _, _) = setup(MockManagedAuth::new());
    coordinator.init().await;
    let session = custom_session(Duration::days(1));
    coordinator.store().write(&session).await.unwrap();

    coordinator
        .handle_auth_event(AuthStateChange::new(
            AuthEvent::TokenRefreshed,
            Some(remote_session_valid_for(Duration::seconds(-1))),
        ))
        .await;

    assert_eq!(
        coordinator.snapshot().session(),
        Some(&SessionSource::Local(session))
    );
}

#[tokio::test]
async fn test_signed_out_event_clears_everything() {
    let (coordinator, storage, _) = setup(MockManagedAuth::new());
    coordinator.establish_session(sample_user()).await.unwrap();

    coordinator
        .handle_auth_event(AuthStateChange::new(AuthEvent::SignedOut, None))
        .await;

    assert!(!coordinator.snapshot().is_authenticated());
    assert!(storage.peek(DEFAULT_SESSION_KEY).await.is_none());
}

#[tokio::test]
async fn test_other_event_rereads_persisted_session() {
    let (coordinator, _, _) = setup(MockManagedAuth::new());
    coordinator.init().await;
    let session = custom_session(Duration::days(1));
    coordinator.store().write(&session).await.unwrap();

    coordinator
        .handle_auth_event(AuthStateChange::new(AuthEvent::TokenRefreshed, None))
        .await;
    assert_eq!(
        coordinator.snapshot().session(),
        Some(&SessionSource::Local(session))
    );

    coordinator.store().clear().await.unwrap();
    coordinator
        .handle_auth_event(AuthStateChange::new(AuthEvent::UserUpdated, None))
        .await;
    assert!(!coordinator.snapshot().is_authenticated());
}

#[tokio::test]
async fn test_listener_applies_provider_events() {
    let (coordinator, _, provider) = setup(MockManagedAuth::new());
    coordinator.init().await;
    let mut rx = coordinator.subscribe();

    let remote = remote_session();
    provider.emit(AuthStateChange::new(AuthEvent::SignedIn, Some(remote.clone())));

    let snapshot = tokio::time::timeout(
        StdDuration::from_secs(1),
        rx.wait_for(|s| s.is_authenticated()),
    )
    .await
    .expect("event should be applied")
    .unwrap()
    .clone();
    assert_eq!(snapshot.session(), Some(&SessionSource::Remote(remote)));
}

#[tokio::test]
async fn test_dispose_stops_listener() {
    let (coordinator, _, provider) = setup(MockManagedAuth::new());
    coordinator.init().await;

    coordinator.dispose();
    tokio::time::sleep(StdDuration::from_millis(20)).await;
    provider.emit(AuthStateChange::new(AuthEvent::SignedIn, Some(remote_session())));
    tokio::time::sleep(StdDuration::from_millis(20)).await;

    assert!(!coordinator.snapshot().is_authenticated());
}

#[tokio::test]
async fn test_sign_out_clears_both_sources() {
    let (coordinator, storage, provider) = setup(MockManagedAuth::new());
    coordinator.init().await;
    coordinator.establish_session(sample_user()).await.unwrap();

    coordinator.sign_out().await.unwrap();

    assert_eq!(provider.sign_out_calls(), 1);
    assert!(!coordinator.snapshot().is_authenticated());
    assert!(!coordinator.snapshot().is_loading());
    assert!(storage.peek(DEFAULT_SESSION_KEY).await.is_none());
}

#[tokio::test]
async fn test_sign_out_failure_drops_local_session() {
    let (coordinator, storage, provider) = setup(MockManagedAuth::new());
    coordinator.init().await;
    coordinator.establish_session(sample_user()).await.unwrap();
    provider.fail_sign_out(true);

    let result = coordinator.sign_out().await;

    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::SignOutFailed { .. }))
    ));
    assert!(!coordinator.snapshot().is_authenticated());
    assert!(!coordinator.snapshot().is_loading());
    assert!(storage.peek(DEFAULT_SESSION_KEY).await.is_none());
}

#[tokio::test]
async fn test_sign_out_failure_keeps_remote_session() {
    let provider = MockManagedAuth::new();
    provider.set_session(Some(remote_session())).await;
    let (coordinator, _, provider) = setup(provider);
    coordinator.init().await;
    provider.fail_sign_out(true);

    assert!(coordinator.sign_out().await.is_err());

    let snapshot = coordinator.snapshot();
    assert!(snapshot.is_authenticated());
    assert!(snapshot.session().map_or(false, SessionSource::is_remote));
    assert!(!snapshot.is_loading());
}

#[tokio::test]
async fn test_establish_session_persists_seven_days() {
    let (coordinator, _, _) = setup(MockManagedAuth::new());
    let user = sample_user();

    let session = coordinator.establish_session(user.clone()).await.unwrap();

    assert_eq!(session.user(), &user);
    assert!(session.expires_at() > chrono::Utc::now() + Duration::days(6));
    let stored = coordinator.store().read().await.unwrap().unwrap();
    assert_eq!(stored.user, user);
    assert!(coordinator.snapshot().is_authenticated());
}

#[tokio::test]
async fn test_establish_session_surfaces_storage_failure() {
    let (coordinator, storage, _) = setup(MockManagedAuth::new());
    storage.fail_all(true);

    let result = coordinator.establish_session(sample_user()).await;

    assert!(matches!(result, Err(DomainError::Storage { .. })));
    assert!(!coordinator.snapshot().is_authenticated());
}
