//! Cache module for Redis-backed storage
//!
//! Provides the Redis client with retry logic and the server-side
//! implementation of the session storage slot.

pub mod redis_client;
pub mod session_storage;


pub use redis_client::RedisClient;
pub use session_storage::RedisSessionStorage;

// Re-export commonly used types
pub use pf_shared::config::CacheConfig;
