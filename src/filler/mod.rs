//! Template filler - produces one filled document per template.
//!
//! With template bytes available the AcroForm fields are filled in place;
//! without them a synthetic page listing every expected field is rendered.

pub mod fallback;
pub mod form;
pub mod naming;

use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

use crate::clock::Clock;
use crate::mapping::FieldMapper;
use crate::models::{ConfidenceMap, DataRecord};
use crate::pdf::{self, PdfError};
use crate::templates::{RepositoryError, TemplateCatalog, TemplateRepository};

pub use form::{FieldFillError, FieldKind, FormField};

#[derive(Debug, Error)]
pub enum FillError {
    #[error("template '{template_id}' could not be loaded: {source}")]
    Repository {
        template_id: String,
        #[source]
        source: RepositoryError,
    },
    #[error("template '{template_id}' could not be processed: {source}")]
    Pdf {
        template_id: String,
        #[source]
        source: PdfError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    Template,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct FilledDocument {
    pub template_id: String,
    pub title: String,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub fields_processed: usize,
    pub fields_total: usize,
    pub mode: FillMode,
}

pub struct TemplateFiller {
    repository: Arc<dyn TemplateRepository>,
    mapper: FieldMapper,
    catalog: TemplateCatalog,
    clock: Arc<dyn Clock>,
}

impl TemplateFiller {
    pub fn new(
        repository: Arc<dyn TemplateRepository>,
        mapper: FieldMapper,
        catalog: TemplateCatalog,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            mapper,
            catalog,
            clock,
        }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn repository(&self) -> &Arc<dyn TemplateRepository> {
        &self.repository
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub async fn fill(
        &self,
        template_id: &str,
        data: &DataRecord,
        confidence: &ConfidenceMap,
    ) -> Result<FilledDocument, FillError> {
        let descriptor = self.catalog.describe(template_id);
        let today = self.clock.today();
        let working = data.with_current_date(today);

        let template = self
            .repository
            .get_template_bytes(template_id)
            .await
            .map_err(|source| FillError::Repository {
                template_id: template_id.to_string(),
                source,
            })?;
        let pdf_error = |source| FillError::Pdf {
            template_id: template_id.to_string(),
            source,
        };

        let (bytes, fields_processed, fields_total, mode) = match template {
            Some(template) => {
                let (bytes, processed, total) =
                    self.fill_template(&template, &working).map_err(pdf_error)?;
                (bytes, processed, total, FillMode::Template)
            }
            None => {
                info!(
                    "No template bytes for '{}', rendering fallback document",
                    template_id
                );
                let render =
                    fallback::render(&descriptor, &working, confidence).map_err(pdf_error)?;
                (
                    render.bytes,
                    render.fields_processed,
                    render.fields_total,
                    FillMode::Fallback,
                )
            }
        };

        info!(
            "Filled '{}' ({:?}): {}/{} fields",
            template_id, mode, fields_processed, fields_total
        );

        Ok(FilledDocument {
            template_id: template_id.to_string(),
            filename: naming::document_filename(&descriptor.title, &working, today),
            title: descriptor.title,
            bytes,
            fields_processed,
            fields_total,
            mode,
        })
    }

    fn fill_template(
        &self,
        template: &[u8],
        data: &DataRecord,
    ) -> Result<(Vec<u8>, usize, usize), PdfError> {
        let mut document = pdf::load(template)?;
        let fields = form::enumerate_fields(&document);
        let font_id = document.add_object(pdf::helvetica());
        let mut processed = 0;

        for field in &fields {
            let key = self
                .mapper
                .map_field_name(&field.name)
                .or_else(|| self.mapper.map_field_name(&field.partial_name));
            let Some(key) = key else {
                debug!("Field '{}' has no canonical key", field.name);
                continue;
            };
            let Some(value) = data.get(key) else {
                debug!("No value for field '{}' ({})", field.name, key);
                continue;
            };

            match form::fill_field(&mut document, field, value, font_id) {
                Ok(()) => processed += 1,
                Err(e) => warn!("Skipping field: {}", e),
            }
        }

        if processed > 0 {
            form::set_need_appearances(&mut document);
        }

        Ok((pdf::save(&mut document)?, processed, fields.len()))
    }
}
