//! Template repository - where fillable PDF templates come from.
//!
//! The filler only needs `get_template_bytes`; `Ok(None)` means "no such
//! template" and switches the filler to its synthetic fallback.

mod cached;
pub mod catalog;
mod fs;
mod supabase;

pub use cached::CachedTemplateRepository;
pub use catalog::{TemplateCatalog, TemplateCategory, TemplateDescriptor};
pub use fs::FsTemplateRepository;
pub use supabase::{SupabaseConfig, SupabaseTemplateRepository};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("invalid template id '{0}'")]
    InvalidId(String),
    #[error("failed to read template '{id}': {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },
    #[error("template storage request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("template storage returned status {status}: {body}")]
    Status { status: u16, body: String },
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Raw template bytes, or `None` when the repository has no such template.
    async fn get_template_bytes(&self, template_id: &str)
        -> Result<Option<Vec<u8>>, RepositoryError>;

    /// Ids of every template the repository currently holds.
    async fn list_templates(&self) -> Result<Vec<String>, RepositoryError>;
}

/// Template ids become object names and file stems, so keep them to a safe
/// character set.
pub(crate) fn validate_template_id(template_id: &str) -> Result<(), RepositoryError> {
    let valid = !template_id.is_empty()
        && !template_id.contains("..")
        && template_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' '));
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::InvalidId(template_id.to_string()))
    }
}
