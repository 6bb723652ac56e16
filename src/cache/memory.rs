use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use log::debug;
use parking_lot::Mutex;
use uuid::Uuid;

use super::{ArtifactStore, CacheEntry, CacheError};
use crate::clock::Clock;

pub const DEFAULT_ARTIFACT_TTL_SECS: i64 = 60 * 60;

/// Process-local artifact store. Expiry is lazy: entries older than the TTL
/// are dropped on the next `put`, and `get` still returns them until then.
pub struct InMemoryArtifactStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl InMemoryArtifactStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, Duration::seconds(DEFAULT_ARTIFACT_TTL_SECS))
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn sweep_locked(&self, entries: &mut HashMap<String, CacheEntry>) -> usize {
        let now = self.clock.now();
        let before = entries.len();
        entries.retain(|_, entry| now - entry.created_at <= self.ttl);
        before - entries.len()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn put(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        filename: &str,
    ) -> Result<String, CacheError> {
        let key = Uuid::new_v4().simple().to_string();
        let entry = CacheEntry {
            key: key.clone(),
            bytes,
            content_type: content_type.to_string(),
            filename: filename.to_string(),
            created_at: self.clock.now(),
        };

        let mut entries = self.entries.lock();
        let swept = self.sweep_locked(&mut entries);
        if swept > 0 {
            debug!("Swept {} expired artifacts", swept);
        }
        entries.insert(key.clone(), entry);
        debug!("Stored artifact {} ({} live)", key, entries.len());

        Ok(key)
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn sweep(&self) -> Result<usize, CacheError> {
        let mut entries = self.entries.lock();
        Ok(self.sweep_locked(&mut entries))
    }
}
