//! Document assembler - fills a selection of templates and merges them, plus
//! one page per uploaded image, into a single combined PDF.

pub mod image_page;
pub mod merge;

use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::filler::{naming, FilledDocument, TemplateFiller};
use crate::models::{ConfidenceMap, DataRecord};
use crate::pdf::{self, PdfError};

pub use image_page::{ImagePage, ImagePurpose};

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("no document or image could be assembled")]
    EmptyResult,
    #[error("combined document could not be built: {0}")]
    Pdf(#[from] PdfError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SkippedImage {
    pub label: String,
    pub reason: String,
}

impl fmt::Display for SkippedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.reason)
    }
}

#[derive(Debug, Clone)]
pub struct CombinedArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub page_count: usize,
    /// Filled documents in selection order; only the successful ones.
    pub documents: Vec<FilledDocument>,
    /// Display titles of the templates whose pages were included.
    pub documents_included: Vec<String>,
    pub images_included: Vec<String>,
    pub images_skipped: Vec<SkippedImage>,
}

pub struct DocumentAssembler {
    filler: Arc<TemplateFiller>,
}

impl DocumentAssembler {
    pub fn new(filler: Arc<TemplateFiller>) -> Self {
        Self { filler }
    }

    /// Fill every template in order, then append the image pages in upload
    /// order. Individual failures are logged and left out of the manifests;
    /// only an empty result is an error.
    pub async fn assemble(
        &self,
        template_ids: &[String],
        data: &DataRecord,
        confidence: &ConfidenceMap,
        images: &[ImagePage],
    ) -> Result<CombinedArtifact, AssemblyError> {
        let mut parts = Vec::new();
        let mut documents = Vec::new();
        let mut documents_included = Vec::new();

        for template_id in template_ids {
            let filled = match self.filler.fill(template_id, data, confidence).await {
                Ok(filled) => filled,
                Err(e) => {
                    warn!("Skipping template '{}': {}", template_id, e);
                    continue;
                }
            };
            match pdf::load(&filled.bytes) {
                Ok(document) => {
                    parts.push(document);
                    documents_included.push(filled.title.clone());
                    documents.push(filled);
                }
                Err(e) => warn!("Skipping template '{}': {}", template_id, e),
            }
        }

        let mut images_included = Vec::new();
        let mut images_skipped = Vec::new();
        for image in images {
            match image_page::render_image_page(image) {
                Ok(document) => {
                    parts.push(document);
                    images_included.push(image.label().to_string());
                }
                Err(e) => {
                    let skipped = SkippedImage {
                        label: image.label().to_string(),
                        reason: e.to_string(),
                    };
                    warn!("Skipping image: {}", skipped);
                    images_skipped.push(skipped);
                }
            }
        }

        if parts.is_empty() {
            return Err(AssemblyError::EmptyResult);
        }

        let mut combined = merge::merge_documents(parts)?;
        let page_count = combined.get_pages().len();
        let bytes = pdf::save(&mut combined)?;
        let filename = naming::packet_filename(data, self.filler.clock().today());

        info!(
            "Assembled {} ({} pages, {} documents, {} images, {} skipped)",
            filename,
            page_count,
            documents_included.len(),
            images_included.len(),
            images_skipped.len()
        );

        Ok(CombinedArtifact {
            bytes,
            filename,
            page_count,
            documents,
            documents_included,
            images_included,
            images_skipped,
        })
    }
}
