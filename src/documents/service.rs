//! Ties the filler, the assembler and the artifact store together.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::{error, info};
use thiserror::Error;

use crate::assembler::{AssemblyError, DocumentAssembler, ImagePage, SkippedImage};
use crate::cache::{ArtifactStore, CacheEntry, CacheError};
use crate::clock::Clock;
use crate::filler::{FillError, FillMode, FilledDocument, TemplateFiller};
use crate::mapping::FieldMapper;
use crate::models::{ConfidenceMap, DataRecord};
use crate::pdf::PDF_MIME_TYPE;
use crate::templates::{
    RepositoryError, TemplateCatalog, TemplateDescriptor, TemplateRepository,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Fill(#[from] FillError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[derive(Debug, Clone)]
pub struct TemplateStatus {
    pub descriptor: TemplateDescriptor,
    /// Whether the repository currently holds a PDF for this template.
    pub available: bool,
}

#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub key: String,
    pub template_id: String,
    pub title: String,
    pub filename: String,
    pub fields_processed: usize,
    pub fields_total: usize,
    pub mode: FillMode,
}

#[derive(Debug, Clone)]
pub struct StoredPacket {
    pub key: String,
    pub filename: String,
    pub page_count: usize,
    pub documents: Vec<StoredDocument>,
    pub documents_included: Vec<String>,
    pub images_included: Vec<String>,
    pub images_skipped: Vec<SkippedImage>,
}

pub struct DocumentService {
    filler: Arc<TemplateFiller>,
    assembler: DocumentAssembler,
    artifacts: Arc<dyn ArtifactStore>,
}

impl DocumentService {
    pub fn new(
        repository: Arc<dyn TemplateRepository>,
        mapper: FieldMapper,
        catalog: TemplateCatalog,
        clock: Arc<dyn Clock>,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Self {
        let filler = Arc::new(TemplateFiller::new(repository, mapper, catalog, clock));
        Self {
            assembler: DocumentAssembler::new(filler.clone()),
            filler,
            artifacts,
        }
    }

    /// Catalog entries followed by any repository template the catalog does
    /// not know about.
    pub async fn list_templates(&self) -> Result<Vec<TemplateStatus>, ServiceError> {
        let stored: BTreeSet<String> = self
            .filler
            .repository()
            .list_templates()
            .await?
            .into_iter()
            .collect();
        let catalog = self.filler.catalog();

        let mut templates: Vec<TemplateStatus> = catalog
            .templates()
            .iter()
            .map(|descriptor| TemplateStatus {
                available: stored.contains(&descriptor.id),
                descriptor: descriptor.clone(),
            })
            .collect();
        templates.extend(
            stored
                .iter()
                .filter(|id| catalog.find(id).is_none())
                .map(|id| TemplateStatus {
                    descriptor: catalog.describe(id),
                    available: true,
                }),
        );

        Ok(templates)
    }

    pub async fn fill_one(
        &self,
        template_id: &str,
        data: &DataRecord,
        confidence: &ConfidenceMap,
    ) -> Result<StoredDocument, ServiceError> {
        let filled = self.filler.fill(template_id, data, confidence).await?;
        self.store_document(filled).await
    }

    /// Assemble the packet, then store every filled document and the combined
    /// PDF so each can be downloaded separately.
    pub async fn assemble(
        &self,
        template_ids: &[String],
        data: &DataRecord,
        confidence: &ConfidenceMap,
        images: &[ImagePage],
    ) -> Result<StoredPacket, ServiceError> {
        let artifact = self
            .assembler
            .assemble(template_ids, data, confidence, images)
            .await?;

        let mut documents = Vec::with_capacity(artifact.documents.len());
        for filled in artifact.documents {
            documents.push(self.store_document(filled).await?);
        }

        let key = self
            .artifacts
            .put(artifact.bytes, PDF_MIME_TYPE, &artifact.filename)
            .await
            .inspect_err(|e| error!("Failed to store combined document: {}", e))?;
        info!("Stored combined document {} as {}", artifact.filename, key);

        Ok(StoredPacket {
            key,
            filename: artifact.filename,
            page_count: artifact.page_count,
            documents,
            documents_included: artifact.documents_included,
            images_included: artifact.images_included,
            images_skipped: artifact.images_skipped,
        })
    }

    pub async fn download(&self, key: &str) -> Result<Option<CacheEntry>, ServiceError> {
        Ok(self.artifacts.get(key).await?)
    }

    async fn store_document(&self, filled: FilledDocument) -> Result<StoredDocument, ServiceError> {
        let key = self
            .artifacts
            .put(filled.bytes, PDF_MIME_TYPE, &filled.filename)
            .await
            .inspect_err(|e| error!("Failed to store {}: {}", filled.filename, e))?;
        info!("Stored {} as {}", filled.filename, key);

        Ok(StoredDocument {
            key,
            template_id: filled.template_id,
            title: filled.title,
            filename: filled.filename,
            fields_processed: filled.fields_processed,
            fields_total: filled.fields_total,
            mode: filled.mode,
        })
    }
}
