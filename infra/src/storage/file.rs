//! File-backed session storage
//!
//! Native clients persist the custom session in a small JSON document that
//! maps keys to entries. Writes replace the whole file through a temporary
//! sibling and a rename, so a crash never leaves a half-written document.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Mutex;

use pf_core::errors::DomainResult;
use pf_core::services::session::SessionStorage;

use crate::InfrastructureError;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

type Document = BTreeMap<String, Entry>;

/// [`SessionStorage`] persisted as one JSON file
///
/// Calls within a process are serialized by an internal lock. Separate
/// processes sharing the file get last-write-wins.
pub struct FileSessionStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document; a missing file is an empty one
    ///
    /// An unreadable document is logged and treated as empty so the next
    /// write replaces it.
    async fn load(&self) -> Result<Document, InfrastructureError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&raw) {
            Ok(document) => Ok(document),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Session file is corrupt, starting from an empty document"
                );
                Ok(Document::new())
            }
        }
    }

    async fn save(&self, document: &Document) -> Result<(), InfrastructureError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let raw = serde_json::to_vec_pretty(document)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;

        let now = Utc::now();
        match document.get(key) {
            Some(entry) if entry.is_live_at(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                tracing::debug!(key, "Dropping expired entry");
                document.remove(key);
                self.save(&document).await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> DomainResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;

        let expires_at = ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .map(|ttl| Utc::now() + ttl);
        document.insert(key.to_string(), Entry { value, expires_at });

        self.save(&document).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> DomainResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;

        if document.remove(key).is_some() {
            self.save(&document).await?;
        }
        Ok(())
    }
}
