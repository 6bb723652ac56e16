use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use moka::future::Cache;

use super::{RepositoryError, TemplateRepository};

const MAX_CACHED_TEMPLATES: u64 = 64;

/// Keeps recently fetched template bytes in memory. Misses and errors are
/// never cached, so a template uploaded later is picked up on the next call.
pub struct CachedTemplateRepository {
    inner: Arc<dyn TemplateRepository>,
    cache: Cache<String, Arc<Vec<u8>>>,
}

impl CachedTemplateRepository {
    pub fn new(inner: Arc<dyn TemplateRepository>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(MAX_CACHED_TEMPLATES)
            .build();
        Self { inner, cache }
    }
}

#[async_trait]
impl TemplateRepository for CachedTemplateRepository {
    async fn get_template_bytes(
        &self,
        template_id: &str,
    ) -> Result<Option<Vec<u8>>, RepositoryError> {
        if let Some(bytes) = self.cache.get(template_id).await {
            debug!("Template cache hit for '{}'", template_id);
            return Ok(Some(bytes.as_ref().clone()));
        }

        let fetched = self.inner.get_template_bytes(template_id).await?;
        if let Some(bytes) = &fetched {
            self.cache
                .insert(template_id.to_string(), Arc::new(bytes.clone()))
                .await;
        }
        Ok(fetched)
    }

    async fn list_templates(&self) -> Result<Vec<String>, RepositoryError> {
        self.inner.list_templates().await
    }
}
