//! Managed-auth provider and client session configuration

use serde::{Deserialize, Serialize};

/// Connection settings for the GoTrue-compatible managed auth provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ManagedAuthConfig {
    /// Base URL of the provider project, e.g. `https://xyz.supabase.co`
    pub url: String,

    /// Public anon key sent as the `apikey` header
    pub anon_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for ManagedAuthConfig {
    fn default() -> Self {
        Self {
            url: String::from("http://localhost:54321"),
            anon_key: String::new(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl ManagedAuthConfig {
    /// Create a new provider configuration
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            ..Default::default()
        }
    }

    /// Endpoint under the provider's auth API
    pub fn auth_endpoint(&self, path: &str) -> String {
        format!(
            "{}/auth/v1/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Custom session persistence settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Storage key the custom session is persisted under
    pub storage_key: String,

    /// Lifetime of a session created after a successful verification
    pub ttl_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: String::from("userSession"),
            ttl_days: 7,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Managed auth provider
    pub provider: ManagedAuthConfig,

    /// Custom session
    #[serde(default)]
    pub session: SessionConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let provider_defaults = ManagedAuthConfig::default();
        let session_defaults = SessionConfig::default();

        Self {
            provider: ManagedAuthConfig {
                url: std::env::var("SUPABASE_URL").unwrap_or(provider_defaults.url),
                anon_key: std::env::var("SUPABASE_ANON_KEY").unwrap_or_default(),
                request_timeout: std::env::var("SUPABASE_REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(provider_defaults.request_timeout),
            },
            session: SessionConfig {
                storage_key: std::env::var("SESSION_STORAGE_KEY")
                    .ok()
                    .filter(|k| !k.is_empty())
                    .unwrap_or(session_defaults.storage_key),
                ttl_days: std::env::var("SESSION_TTL_DAYS")
                    .ok()
                    .and_then(|d| d.parse().ok())
                    .filter(|d: &i64| *d > 0)
                    .unwrap_or(session_defaults.ttl_days),
            },
        }
    }
}

fn default_request_timeout() -> u64 {
    10
}
