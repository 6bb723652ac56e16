use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use log::debug;

use super::{validate_template_id, RepositoryError, TemplateRepository};

const TEMPLATE_EXTENSION: &str = "pdf";

/// Templates stored as `<root>/<template_id>.pdf`.
#[derive(Debug, Clone)]
pub struct FsTemplateRepository {
    root: PathBuf,
}

impl FsTemplateRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn template_path(&self, template_id: &str) -> PathBuf {
        self.root.join(format!("{}.{}", template_id, TEMPLATE_EXTENSION))
    }
}

#[async_trait]
impl TemplateRepository for FsTemplateRepository {
    async fn get_template_bytes(
        &self,
        template_id: &str,
    ) -> Result<Option<Vec<u8>>, RepositoryError> {
        validate_template_id(template_id)?;
        let path = self.template_path(template_id);
        debug!("Reading template '{}' from {}", template_id, path.display());

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(RepositoryError::Io {
                id: template_id.to_string(),
                source,
            }),
        }
    }

    async fn list_templates(&self) -> Result<Vec<String>, RepositoryError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(RepositoryError::Io {
                    id: self.root.display().to_string(),
                    source,
                })
            }
        };

        let mut ids = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|source| RepositoryError::Io {
                id: self.root.display().to_string(),
                source,
            })?;
            let Some(entry) = entry else { break };
            let path = entry.path();
            let is_template = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == TEMPLATE_EXTENSION);
            if !is_template {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_existing_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("buyers-order.pdf"), b"%PDF-1.5 fake").unwrap();
        let repo = FsTemplateRepository::new(dir.path());

        let bytes = repo.get_template_bytes("buyers-order").await.unwrap();

        assert_eq!(bytes.as_deref(), Some(&b"%PDF-1.5 fake"[..]));
    }

    #[tokio::test]
    async fn test_missing_template_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsTemplateRepository::new(dir.path());

        let bytes = repo.get_template_bytes("credit-application").await.unwrap();

        assert!(bytes.is_none());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsTemplateRepository::new(dir.path());

        let result = repo.get_template_bytes("../etc/passwd").await;

        assert!(matches!(result, Err(RepositoryError::InvalidId(_))));
    }

    #[tokio::test]
    async fn test_lists_pdf_stems_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("title-application.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("buyers-order.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("scan.PDF"), b"x").unwrap();
        let repo = FsTemplateRepository::new(dir.path());

        let ids = repo.list_templates().await.unwrap();

        assert_eq!(ids, vec!["buyers-order", "title-application"]);
    }
}
