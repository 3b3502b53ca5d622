//! Unit tests for mock user repository

use chrono::{Duration, Utc};

use crate::domain::entities::user::User;
use crate::errors::DomainError;
use crate::repositories::user::{MockUserRepository, UserRepository};

#[tokio::test]
async fn test_mock_repository_create_and_find() {
    let repo = MockUserRepository::new();
    let user = User::new("56912345678".to_string());

    let created = repo.create(user.clone()).await.unwrap();
    assert_eq!(created.id, user.id);

    let found = repo.find_by_phone("56912345678").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(user.id));
    assert!(repo.find_by_phone("56900000000").await.unwrap().is_none());
}

#[tokio::test]
async fn test_mock_repository_duplicate_phone() {
    let repo = MockUserRepository::new();

    repo.create(User::new("56912345678".to_string())).await.unwrap();
    let result = repo.create(User::new("56912345678".to_string())).await;

    assert!(matches!(result, Err(DomainError::Persistence { .. })));
    assert_eq!(repo.write_count(), 1);
}

#[tokio::test]
async fn test_update_code_requires_existing_row() {
    let repo = MockUserRepository::new();
    let result = repo
        .update_code("56912345678", "12345", Utc::now() + Duration::minutes(5))
        .await;

    assert!(matches!(result, Err(DomainError::Persistence { .. })));
}

#[tokio::test]
async fn test_consume_code_is_single_use() {
    let repo = MockUserRepository::new();
    let now = Utc::now();
    repo.insert(User::with_code(
        "56912345678".to_string(),
        "48213".to_string(),
        now + Duration::minutes(5),
    ))
    .await;

    let first = repo.consume_code("56912345678", "48213", Some(now)).await.unwrap();
    assert!(first.is_some());
    assert!(first.unwrap().security_code.is_none());

    let second = repo.consume_code("56912345678", "48213", Some(now)).await.unwrap();
    assert!(second.is_none());
}

#[tokio::test]
async fn test_consume_code_honours_expiry_only_when_asked() {
    let repo = MockUserRepository::new();
    let issued = Utc::now();
    repo.insert(User::with_code(
        "56912345678".to_string(),
        "48213".to_string(),
        issued + Duration::minutes(5),
    ))
    .await;

    let late = issued + Duration::seconds(301);
    assert!(repo
        .consume_code("56912345678", "48213", Some(late))
        .await
        .unwrap()
        .is_none());
    assert!(repo
        .consume_code("56912345678", "48213", None)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_failure_switches() {
    let repo = MockUserRepository::new();

    repo.fail_lookups(true);
    assert!(matches!(
        repo.find_by_phone("56912345678").await,
        Err(DomainError::UserLookup { .. })
    ));

    repo.fail_writes(true);
    assert!(matches!(
        repo.create(User::new("56912345678".to_string())).await,
        Err(DomainError::Persistence { .. })
    ));
}
