//! Configuration module
//!
//! Environment-driven configuration for the tools API: server settings shared
//! with any future service, plus the artifact-session timings and the upload
//! limits used by the file tools.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

// Common constants
const SERVER_PORT: u16 = 4000;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;

const SESSION_TTL_SECS: u64 = 240;
const SESSION_SWEEP_INTERVAL_SECS: u64 = 60;
const DOWNLOAD_RELEASE_GRACE_MS: u64 = 1000;
const DOWNLOAD_LEASE_TIMEOUT_SECS: u64 = 300;
const MAX_IMAGE_SIZE_MB: usize = 10;
const MAX_DOCUMENT_SIZE_MB: usize = 25;
const MAX_TEXT_LENGTH: usize = 200_000;
const MAX_MERGE_FILES: usize = 10;

/// Base configuration shared by every service
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub request_timeout_secs: u64,
    pub http_concurrency_limit: usize,
    /// `compact` or `json`
    pub log_format: String,
}

/// Tools service configuration
#[derive(Clone, Debug)]
pub struct ToolsConfig {
    pub base: BaseConfig,
    /// Root directory for uploaded inputs and produced outputs
    pub temp_storage_path: PathBuf,
    // Artifact session timings
    pub session_ttl_secs: u64,
    pub session_sweep_interval_secs: u64,
    pub download_release_grace_ms: u64,
    pub download_lease_timeout_secs: u64,
    // Upload limits
    pub max_image_size_bytes: usize,
    pub image_allowed_extensions: Vec<String>,
    pub image_allowed_content_types: Vec<String>,
    pub max_document_size_bytes: usize,
    pub document_allowed_extensions: Vec<String>,
    pub document_allowed_content_types: Vec<String>,
    pub max_text_length: usize,
    /// Most PDFs a single merge accepts
    pub max_merge_files: usize,
}

/// Application configuration (tools API).
#[derive(Clone, Debug)]
pub struct Config(pub Box<ToolsConfig>);

impl Config {
    fn as_tools(&self) -> &ToolsConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_tools().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ToolsConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_tools().validate()
    }

    // Convenience getters
    pub fn server_port(&self) -> u16 {
        self.as_tools().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_tools().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_tools().base.environment
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.as_tools().base.request_timeout_secs)
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_tools().base.http_concurrency_limit
    }

    pub fn log_format(&self) -> &str {
        &self.as_tools().base.log_format
    }

    pub fn temp_storage_path(&self) -> &PathBuf {
        &self.as_tools().temp_storage_path
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.as_tools().session_ttl_secs)
    }

    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.as_tools().session_sweep_interval_secs)
    }

    pub fn download_release_grace(&self) -> Duration {
        Duration::from_millis(self.as_tools().download_release_grace_ms)
    }

    pub fn download_lease_timeout(&self) -> Duration {
        Duration::from_secs(self.as_tools().download_lease_timeout_secs)
    }

    pub fn max_image_size_bytes(&self) -> usize {
        self.as_tools().max_image_size_bytes
    }

    pub fn image_allowed_extensions(&self) -> &[String] {
        &self.as_tools().image_allowed_extensions
    }

    pub fn image_allowed_content_types(&self) -> &[String] {
        &self.as_tools().image_allowed_content_types
    }

    pub fn max_document_size_bytes(&self) -> usize {
        self.as_tools().max_document_size_bytes
    }

    pub fn document_allowed_extensions(&self) -> &[String] {
        &self.as_tools().document_allowed_extensions
    }

    pub fn document_allowed_content_types(&self) -> &[String] {
        &self.as_tools().document_allowed_content_types
    }

    pub fn max_text_length(&self) -> usize {
        self.as_tools().max_text_length
    }

    pub fn max_merge_files(&self) -> usize {
        self.as_tools().max_merge_files
    }
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn split_list(value: String) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ToolsConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// `from_env` delegates here with the process environment; tests pass a map.
    pub fn from_lookup<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: var("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            http_concurrency_limit: var("HTTP_CONCURRENCY_LIMIT")
                .unwrap_or_else(|| HTTP_CONCURRENCY_LIMIT.to_string())
                .parse()
                .unwrap_or(HTTP_CONCURRENCY_LIMIT),
            log_format: var("LOG_FORMAT")
                .map(|s| s.trim().to_lowercase())
                .unwrap_or_else(|| "compact".to_string()),
        };

        let temp_storage_path = var("TEMP_STORAGE_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("studenthub"));

        let config = ToolsConfig {
            base,
            temp_storage_path,
            session_ttl_secs: var("SESSION_TTL_SECS")
                .unwrap_or_else(|| SESSION_TTL_SECS.to_string())
                .parse()
                .unwrap_or(SESSION_TTL_SECS),
            session_sweep_interval_secs: var("SESSION_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|| SESSION_SWEEP_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(SESSION_SWEEP_INTERVAL_SECS),
            download_release_grace_ms: var("DOWNLOAD_RELEASE_GRACE_MS")
                .unwrap_or_else(|| DOWNLOAD_RELEASE_GRACE_MS.to_string())
                .parse()
                .unwrap_or(DOWNLOAD_RELEASE_GRACE_MS),
            download_lease_timeout_secs: var("DOWNLOAD_LEASE_TIMEOUT_SECS")
                .unwrap_or_else(|| DOWNLOAD_LEASE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DOWNLOAD_LEASE_TIMEOUT_SECS),
            max_image_size_bytes: var("MAX_IMAGE_SIZE_MB")
                .unwrap_or_else(|| MAX_IMAGE_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_IMAGE_SIZE_MB)
                * 1024
                * 1024,
            image_allowed_extensions: split_list(
                var("IMAGE_ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|| "jpg,jpeg,png,gif,webp,bmp".to_string()),
            ),
            image_allowed_content_types: split_list(var("IMAGE_ALLOWED_CONTENT_TYPES").unwrap_or_else(
                || "image/jpeg,image/png,image/gif,image/webp,image/bmp".to_string(),
            )),
            max_document_size_bytes: var("MAX_DOCUMENT_SIZE_MB")
                .unwrap_or_else(|| MAX_DOCUMENT_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_DOCUMENT_SIZE_MB)
                * 1024
                * 1024,
            document_allowed_extensions: split_list(
                var("DOCUMENT_ALLOWED_EXTENSIONS").unwrap_or_else(|| "pdf".to_string()),
            ),
            document_allowed_content_types: split_list(
                var("DOCUMENT_ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|| "application/pdf".to_string()),
            ),
            max_text_length: var("MAX_TEXT_LENGTH")
                .unwrap_or_else(|| MAX_TEXT_LENGTH.to_string())
                .parse()
                .unwrap_or(MAX_TEXT_LENGTH),
            max_merge_files: var("MAX_MERGE_FILES")
                .unwrap_or_else(|| MAX_MERGE_FILES.to_string())
                .parse()
                .unwrap_or(MAX_MERGE_FILES),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.session_ttl_secs == 0 {
            return Err(anyhow::anyhow!("SESSION_TTL_SECS must be greater than 0"));
        }

        if self.session_sweep_interval_secs == 0 {
            return Err(anyhow::anyhow!(
                "SESSION_SWEEP_INTERVAL_SECS must be greater than 0"
            ));
        }

        if self.download_lease_timeout_secs < self.session_sweep_interval_secs {
            return Err(anyhow::anyhow!(
                "DOWNLOAD_LEASE_TIMEOUT_SECS must not be shorter than SESSION_SWEEP_INTERVAL_SECS"
            ));
        }

        if self.base.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be greater than 0"));
        }

        if self.base.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!(
                "HTTP_CONCURRENCY_LIMIT must be greater than 0"
            ));
        }

        if self.max_image_size_bytes == 0 || self.max_document_size_bytes == 0 {
            return Err(anyhow::anyhow!("Upload size limits must be greater than 0"));
        }

        if self.image_allowed_extensions.is_empty() || self.document_allowed_extensions.is_empty()
        {
            return Err(anyhow::anyhow!(
                "IMAGE_ALLOWED_EXTENSIONS and DOCUMENT_ALLOWED_EXTENSIONS must not be empty"
            ));
        }

        if !matches!(self.base.log_format.as_str(), "compact" | "json") {
            return Err(anyhow::anyhow!("LOG_FORMAT must be 'compact' or 'json'"));
        }

        if self.max_text_length == 0 {
            return Err(anyhow::anyhow!("MAX_TEXT_LENGTH must be greater than 0"));
        }

        if self.max_merge_files < 2 {
            return Err(anyhow::anyhow!("MAX_MERGE_FILES must be at least 2"));
        }

        Ok(())
    }
}
