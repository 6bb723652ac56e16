use async_trait::async_trait;
use log::{debug, error};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::{validate_template_id, RepositoryError, TemplateRepository};

const LIST_LIMIT: u32 = 1000;

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub supabase_url: String,
    pub service_key: String,
    pub bucket_name: String,
    /// Folder inside the bucket holding the templates, without slashes.
    pub prefix: String,
}

impl SupabaseConfig {
    fn object_path(&self, template_id: &str) -> String {
        if self.prefix.is_empty() {
            format!("{}.pdf", template_id)
        } else {
            format!("{}/{}.pdf", self.prefix, template_id)
        }
    }
}

/// Templates stored in a Supabase Storage bucket as `<prefix>/<id>.pdf`.
#[derive(Clone)]
pub struct SupabaseTemplateRepository {
    config: SupabaseConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct StorageObject {
    name: String,
    #[serde(default)]
    id: Option<String>,
}

impl SupabaseTemplateRepository {
    pub fn new(config: SupabaseConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn object_url(&self, template_id: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.config.supabase_url.trim_end_matches('/'),
            self.config.bucket_name,
            self.config.object_path(template_id)
        )
    }

    fn list_url(&self) -> String {
        format!(
            "{}/storage/v1/object/list/{}",
            self.config.supabase_url.trim_end_matches('/'),
            self.config.bucket_name
        )
    }
}

/// Supabase reports a missing object either as a plain 404 or as a 400 whose
/// body carries a `not_found` error code.
fn is_not_found(status: StatusCode, body: &str) -> bool {
    status == StatusCode::NOT_FOUND
        || (status == StatusCode::BAD_REQUEST
            && (body.contains("not_found") || body.contains("Object not found")))
}

#[async_trait]
impl TemplateRepository for SupabaseTemplateRepository {
    async fn get_template_bytes(
        &self,
        template_id: &str,
    ) -> Result<Option<Vec<u8>>, RepositoryError> {
        validate_template_id(template_id)?;
        let url = self.object_url(template_id);
        debug!("Downloading template '{}' from {}", template_id, url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.service_key)
            .header("apikey", &self.config.service_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            return Ok(Some(bytes.to_vec()));
        }

        let body = response.text().await.unwrap_or_default();
        if is_not_found(status, &body) {
            debug!("Template '{}' not present in bucket", template_id);
            return Ok(None);
        }

        error!(
            "Template download for '{}' failed with {}: {}",
            template_id, status, body
        );
        Err(RepositoryError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn list_templates(&self) -> Result<Vec<String>, RepositoryError> {
        let response = self
            .client
            .post(self.list_url())
            .bearer_auth(&self.config.service_key)
            .header("apikey", &self.config.service_key)
            .json(&json!({
                "prefix": self.config.prefix,
                "limit": LIST_LIMIT,
                "offset": 0,
                "sortBy": { "column": "name", "order": "asc" }
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RepositoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let objects: Vec<StorageObject> = response.json().await?;
        Ok(objects
            .into_iter()
            // Folders come back without an id.
            .filter(|object| object.id.is_some())
            .filter_map(|object| object.name.strip_suffix(".pdf").map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(prefix: &str) -> SupabaseConfig {
        SupabaseConfig {
            supabase_url: "https://test.supabase.co/".to_string(),
            service_key: "service-key".to_string(),
            bucket_name: "dealer-templates".to_string(),
            prefix: prefix.to_string(),
        }
    }

    #[test]
    fn test_object_url_with_prefix() {
        let repo = SupabaseTemplateRepository::new(config("forms"), reqwest::Client::new());
        assert_eq!(
            repo.object_url("buyers-order"),
            "https://test.supabase.co/storage/v1/object/dealer-templates/forms/buyers-order.pdf"
        );
    }

    #[test]
    fn test_object_url_without_prefix() {
        let repo = SupabaseTemplateRepository::new(config(""), reqwest::Client::new());
        assert_eq!(
            repo.object_url("buyers-order"),
            "https://test.supabase.co/storage/v1/object/dealer-templates/buyers-order.pdf"
        );
        assert_eq!(
            repo.list_url(),
            "https://test.supabase.co/storage/v1/object/list/dealer-templates"
        );
    }

    #[test]
    fn test_not_found_detection() {
        assert!(is_not_found(StatusCode::NOT_FOUND, ""));
        assert!(is_not_found(
            StatusCode::BAD_REQUEST,
            r#"{"statusCode":"404","error":"not_found","message":"Object not found"}"#
        ));
        assert!(!is_not_found(StatusCode::BAD_REQUEST, r#"{"error":"invalid_jwt"}"#));
        assert!(!is_not_found(StatusCode::INTERNAL_SERVER_ERROR, "not_found"));
    }
}
