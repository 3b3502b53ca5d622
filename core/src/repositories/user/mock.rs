//! In-memory implementation of UserRepository for tests and local runs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

use super::trait_::UserRepository;

/// Mock user repository keyed by phone number
///
/// Lookups and writes can be switched to fail so callers can exercise their
/// error paths.
pub struct MockUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
    fail_lookups: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MockUserRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            fail_lookups: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Seed a row directly, bypassing the write counter
    pub async fn insert(&self, user: User) {
        self.users
            .write()
            .await
            .insert(user.phone_number.clone(), user);
    }

    /// Current row for a phone
    pub async fn get(&self, phone_number: &str) -> Option<User> {
        self.users.read().await.get(phone_number).cloned()
    }

    /// Make every lookup fail with a database error
    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    /// Make every insert/update fail with a database error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes (create, update_code, consume_code)
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_lookup(&self) -> Result<(), DomainError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(DomainError::UserLookup {
                message: "simulated lookup failure".to_string(),
            });
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::Persistence {
                message: "simulated write failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, DomainError> {
        self.check_lookup()?;
        let users = self.users.read().await;
        Ok(users.get(phone_number).cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        self.check_write()?;
        let mut users = self.users.write().await;

        if users.contains_key(&user.phone_number) {
            return Err(DomainError::Persistence {
                message: "duplicate key value violates unique constraint \"users_phone_number_key\""
                    .to_string(),
            });
        }

        users.insert(user.phone_number.clone(), user.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(user)
    }

    async fn update_code(
        &self,
        phone_number: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<User, DomainError> {
        self.check_write()?;
        let mut users = self.users.write().await;

        let user = users
            .get_mut(phone_number)
            .ok_or_else(|| DomainError::Persistence {
                message: format!("no user row for phone {}", phone_number),
            })?;

        user.issue_code(code.to_string(), expires_at, Utc::now());

        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(user.clone())
    }

    async fn consume_code(
        &self,
        phone_number: &str,
        code: &str,
        valid_at: Option<DateTime<Utc>>,
    ) -> Result<Option<User>, DomainError> {
        self.check_lookup()?;
        // Single write lock: match and clear cannot interleave with another consume
        let mut users = self.users.write().await;

        let Some(user) = users.get_mut(phone_number) else {
            return Ok(None);
        };

        let accepted = match valid_at {
            Some(now) => user.accepts_code(code, now, true),
            None => user.accepts_code(code, Utc::now(), false),
        };
        if !accepted {
            return Ok(None);
        }

        user.clear_code();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(user.clone()))
    }
}
