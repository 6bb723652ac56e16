//! Environment configuration, loaded once at startup.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::templates::SupabaseConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TEMPLATE_DIR: &str = "./templates";
const DEFAULT_TEMPLATE_PREFIX: &str = "templates";
const DEFAULT_TEMPLATE_BUCKET: &str = "templates";
const DEFAULT_TEMPLATE_CACHE_SECS: u64 = 10 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be set when {required_by} is set")]
    Missing {
        name: &'static str,
        required_by: &'static str,
    },
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub enum TemplateSource {
    Directory(PathBuf),
    Supabase(SupabaseConfig),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub templates: TemplateSource,
    pub template_cache_ttl: Duration,
}

impl AppConfig {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source; blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let host = var("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var("SERVER_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "SERVER_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };
        let cache_secs = match var("TEMPLATE_CACHE_SECS") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "TEMPLATE_CACHE_SECS",
                value,
            })?,
            None => DEFAULT_TEMPLATE_CACHE_SECS,
        };

        let templates = match var("SUPABASE_URL") {
            Some(supabase_url) => {
                let service_key = var("SUPABASE_SERVICE_KEY").ok_or(ConfigError::Missing {
                    name: "SUPABASE_SERVICE_KEY",
                    required_by: "SUPABASE_URL",
                })?;
                TemplateSource::Supabase(SupabaseConfig {
                    supabase_url,
                    service_key,
                    bucket_name: var("TEMPLATE_BUCKET")
                        .unwrap_or_else(|| DEFAULT_TEMPLATE_BUCKET.to_string()),
                    prefix: var("TEMPLATE_PREFIX")
                        .map(|prefix| prefix.trim_matches('/').to_string())
                        .unwrap_or_else(|| DEFAULT_TEMPLATE_PREFIX.to_string()),
                })
            }
            None => TemplateSource::Directory(PathBuf::from(
                var("TEMPLATE_DIR").unwrap_or_else(|| DEFAULT_TEMPLATE_DIR.to_string()),
            )),
        };

        Ok(Self {
            host,
            port,
            templates,
            template_cache_ttl: Duration::from_secs(cache_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.template_cache_ttl, Duration::from_secs(600));
        assert!(matches!(
            config.templates,
            TemplateSource::Directory(ref dir) if dir == &PathBuf::from("./templates")
        ));
    }

    #[test]
    fn test_supabase_source() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://example.supabase.co"),
            ("SUPABASE_SERVICE_KEY", "secret"),
            ("TEMPLATE_PREFIX", "/forms/"),
        ]))
        .unwrap();

        let TemplateSource::Supabase(supabase) = config.templates else {
            panic!("expected supabase source");
        };
        assert_eq!(supabase.prefix, "forms");
        assert_eq!(supabase.bucket_name, "templates");
    }

    #[test]
    fn test_supabase_requires_key() {
        let result = AppConfig::from_lookup(lookup(&[("SUPABASE_URL", "https://x.supabase.co")]));

        assert!(matches!(
            result,
            Err(ConfigError::Missing {
                name: "SUPABASE_SERVICE_KEY",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_port() {
        let result = AppConfig::from_lookup(lookup(&[("SERVER_PORT", "eighty")]));

        assert!(matches!(result, Err(ConfigError::Invalid { name: "SERVER_PORT", .. })));
    }
}
