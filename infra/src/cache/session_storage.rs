//! Redis-backed session storage
//!
//! Each session key maps to one Redis string. When the caller passes a TTL
//! the key is written with `SET EX`, so Redis drops the session at the same
//! moment it would stop being valid.

use async_trait::async_trait;
use std::time::Duration;

use pf_core::errors::DomainResult;
use pf_core::services::session::SessionStorage;

use super::redis_client::RedisClient;

/// [`SessionStorage`] on top of [`RedisClient`]
///
/// Keys are namespaced with the client's configured prefix.
#[derive(Clone)]
pub struct RedisSessionStorage {
    client: RedisClient,
}

impl RedisSessionStorage {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    fn redis_key(&self, key: &str) -> String {
        self.client.config().prefixed_key(key)
    }
}

/// Whole seconds for `SET EX`, never below one
pub(crate) fn expiry_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

#[async_trait]
impl SessionStorage for RedisSessionStorage {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        Ok(self.client.get(&self.redis_key(key)).await?)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> DomainResult<()> {
        let redis_key = self.redis_key(key);
        match ttl {
            Some(ttl) => {
                self.client
                    .set_with_expiry(&redis_key, &value, expiry_seconds(ttl))
                    .await?
            }
            None => self.client.set(&redis_key, &value).await?,
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> DomainResult<()> {
        let existed = self.client.delete(&self.redis_key(key)).await?;
        if !existed {
            tracing::debug!(key, "Session key was already absent");
        }
        Ok(())
    }
}
