//! Transient store for generated artifacts, addressed by opaque keys.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use memory::{InMemoryArtifactStore, DEFAULT_ARTIFACT_TTL_SECS};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("artifact store failure: {0}")]
    Backend(String),
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store a new artifact and return its key. Expired entries may be swept
    /// as part of the call.
    async fn put(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        filename: &str,
    ) -> Result<String, CacheError>;

    /// `Ok(None)` for keys that were never issued or have been swept.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Remove expired entries, returning how many were dropped.
    async fn sweep(&self) -> Result<usize, CacheError>;
}
