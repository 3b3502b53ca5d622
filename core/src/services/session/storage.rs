//! Key-value slot abstraction the custom session is persisted in

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::errors::{DomainError, DomainResult};

/// Storage slot for serialized sessions
///
/// Writes are last-write-wins. There is no locking or versioning between
/// concurrent writers.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Read the raw value stored under `key`
    async fn get(&self, key: &str) -> DomainResult<Option<String>>;

    /// Store `value` under `key`
    ///
    /// Backends that support expiry drop the value after `ttl`; others keep
    /// it until removed.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> DomainResult<()>;

    /// Remove the value under `key`; removing a missing key is not an error
    async fn remove(&self, key: &str) -> DomainResult<()>;
}

/// Process-local storage, also used as the test double
#[derive(Default)]
pub struct InMemorySessionStorage {
    values: RwLock<HashMap<String, String>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    removes: AtomicUsize,
    fail: AtomicBool,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn remove_count(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }

    /// Make every call fail with a storage error
    pub fn fail_all(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Raw value currently held under `key`, without counting a read
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }

    fn check(&self) -> DomainResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::Storage {
                message: "simulated storage failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String, _ttl: Option<Duration>) -> DomainResult<()> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> DomainResult<()> {
        self.check()?;
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.values.write().await.remove(key);
        Ok(())
    }
}
