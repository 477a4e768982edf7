use crate::app::{ExtractLanguage, Locale};
use crate::error::ConfigError;
use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings, layered from defaults, `pdf_uploader.toml` and
/// `PDF_UPLOADER_*` environment variables.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct UploaderConfig {
    pub base_url: String,
    pub upload_path: String,
    pub extract_path: String,
    pub field_name: String,
    pub language: ExtractLanguage,
    pub locale: Locale,
    pub request_timeout_secs: u64,
    pub chunk_size: usize,
    /// Extra font for glyphs the built-in egui fonts lack (CJK status text).
    pub font_path: Option<PathBuf>,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5001".to_string(),
            upload_path: "/api/pdf/upload".to_string(),
            extract_path: "/api/pdf/extract".to_string(),
            field_name: "pdf_file".to_string(),
            language: ExtractLanguage::default(),
            locale: Locale::default(),
            request_timeout_secs: 300,
            chunk_size: 64 * 1024,
            font_path: None,
        }
    }
}

impl UploaderConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(ConfigFile::with_name("pdf_uploader").required(false))
            .add_source(Environment::with_prefix("PDF_UPLOADER").try_parsing(true))
            .build()?;

        let config: UploaderConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        reqwest::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(())
    }

    pub fn upload_url(&self) -> String {
        join_url(&self.base_url, &self.upload_path)
    }

    pub fn extract_url(&self) -> String {
        join_url(&self.base_url, &self.extract_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout())
            .build()?)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
