use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::service::{StoredDocument, StoredPacket, TemplateStatus};
use crate::assembler::{ImagePage, ImagePurpose, SkippedImage};
use crate::filler::FillMode;
use crate::models::{ConfidenceMap, DataRecord};
use crate::templates::TemplateCategory;

pub const DOWNLOAD_PATH: &str = "/api/downloads";

fn download_url(key: &str) -> String {
    format!("{}/{}", DOWNLOAD_PATH, key)
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FillRequest {
    pub template_id: String,
    /// Extracted values keyed by canonical field key.
    #[schema(value_type = Object)]
    #[serde(default)]
    pub data: DataRecord,
    /// `high`, `medium` or `low` per canonical field key.
    #[schema(value_type = Object)]
    #[serde(default)]
    pub confidence: ConfidenceMap,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssembleRequest {
    pub template_ids: Vec<String>,
    #[schema(value_type = Object)]
    #[serde(default)]
    pub data: DataRecord,
    #[schema(value_type = Object)]
    #[serde(default)]
    pub confidence: ConfidenceMap,
    /// Appended after the documents, in this order.
    #[serde(default)]
    pub images: Vec<ImageUpload>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    /// e.g. `driversLicense`, `newCarOdometer`; free text becomes the page label.
    pub purpose: String,
    pub media_type: String,
    /// Base64 image bytes; a `data:` URL prefix is accepted.
    pub data: String,
}

impl ImageUpload {
    pub fn decode(&self) -> Result<ImagePage, String> {
        let encoded = match self.data.split_once(',') {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => self.data.as_str(),
        };
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| format!("image '{}' is not valid base64: {}", self.purpose, e))?;
        let purpose = self
            .purpose
            .parse::<ImagePurpose>()
            .unwrap_or_else(|never| match never {});
        Ok(ImagePage::new(bytes, self.media_type.clone(), purpose))
    }
}

/// Documentation-only shape of the multipart upload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssembleUploadForm {
    /// `AssembleRequest` JSON without `images`.
    #[allow(unused)]
    pub request: String,
    /// Each file part is an image; the part name is its purpose.
    #[allow(unused)]
    #[schema(value_type = Vec<String>, format = Binary)]
    pub images: Vec<Vec<u8>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLink {
    pub key: String,
    pub template_id: String,
    pub title: String,
    pub filename: String,
    pub download_url: String,
    pub fields_processed: usize,
    pub fields_total: usize,
    /// `template` when a PDF form was filled, `fallback` for the synthetic page.
    pub mode: String,
}

impl From<StoredDocument> for DocumentLink {
    fn from(document: StoredDocument) -> Self {
        let mode = match document.mode {
            FillMode::Template => "template",
            FillMode::Fallback => "fallback",
        };
        Self {
            download_url: download_url(&document.key),
            key: document.key,
            template_id: document.template_id,
            title: document.title,
            filename: document.filename,
            fields_processed: document.fields_processed,
            fields_total: document.fields_total,
            mode: mode.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssembleResponse {
    pub key: String,
    pub filename: String,
    pub download_url: String,
    pub page_count: usize,
    pub documents: Vec<DocumentLink>,
    pub documents_included: Vec<String>,
    pub images_included: Vec<String>,
    pub images_skipped: Vec<SkippedImage>,
}

impl From<StoredPacket> for AssembleResponse {
    fn from(packet: StoredPacket) -> Self {
        Self {
            download_url: download_url(&packet.key),
            key: packet.key,
            filename: packet.filename,
            page_count: packet.page_count,
            documents: packet.documents.into_iter().map(DocumentLink::from).collect(),
            documents_included: packet.documents_included,
            images_included: packet.images_included,
            images_skipped: packet.images_skipped,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: String,
    pub title: String,
    pub category: TemplateCategory,
    pub available: bool,
}

impl From<TemplateStatus> for TemplateSummary {
    fn from(status: TemplateStatus) -> Self {
        Self {
            id: status.descriptor.id,
            title: status.descriptor.title,
            category: status.descriptor.category,
            available: status.available,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateSummary>,
}
