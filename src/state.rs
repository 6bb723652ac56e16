//! Shared application state handed to every handler.

use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::cache::{ArtifactStore, InMemoryArtifactStore};
use crate::clock::{Clock, SystemClock};
use crate::config::{AppConfig, TemplateSource};
use crate::documents::DocumentService;
use crate::mapping::FieldMapper;
use crate::templates::{
    CachedTemplateRepository, FsTemplateRepository, SupabaseTemplateRepository, TemplateCatalog,
    TemplateRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<DocumentService>,
}

impl AppState {
    pub fn new(documents: Arc<DocumentService>) -> Self {
        Self { documents }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let repository: Arc<dyn TemplateRepository> = match &config.templates {
            TemplateSource::Directory(root) => {
                info!("Loading templates from {}", root.display());
                Arc::new(FsTemplateRepository::new(root.clone()))
            }
            TemplateSource::Supabase(supabase) => {
                info!(
                    "Loading templates from Supabase bucket '{}'",
                    supabase.bucket_name
                );
                let client = reqwest::Client::builder()
                    .pool_idle_timeout(Duration::from_secs(900))
                    .user_agent("dealer-forms-server/0.1")
                    .build()?;
                Arc::new(SupabaseTemplateRepository::new(supabase.clone(), client))
            }
        };
        let repository = Arc::new(CachedTemplateRepository::new(
            repository,
            config.template_cache_ttl,
        ));

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let artifacts: Arc<dyn ArtifactStore> = Arc::new(InMemoryArtifactStore::new(clock.clone()));

        Ok(Self::new(Arc::new(DocumentService::new(
            repository,
            FieldMapper::default(),
            TemplateCatalog::default(),
            clock,
            artifacts,
        ))))
    }
}
