//! Configuration module for Shelf-Eye
//!
//! Everything is environment-driven and read once at startup.
//! Defaults live in utils/constants.rs.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, DEFAULT_HOST, DEFAULT_MAX_UPLOAD_MB,
    DEFAULT_PORT, DEFAULT_REFERENCE_DIR, REFERENCE_IMAGE_FILE, REFERENCE_LAYOUT_FILE,
    STANDARD_PRICES_FILE,
};

/// Connection settings for the Gemini endpoint
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// None means the request waits as long as the transport allows
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for GeminiConfig {
    // Key is never printed
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    /// Base directory of the reference slot
    pub reference_dir: PathBuf,
    /// Optional directory with prompt template overrides
    pub prompt_dir: Option<PathBuf>,
    pub max_upload_mb: usize,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var("GEMINI_API_KEY").ok_or_else(|| AppError::missing_env("GEMINI_API_KEY"))?;
        info!("🔑 GEMINI_API_KEY configured (key hidden for security)");

        let timeout = match var("GEMINI_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(parse_number("GEMINI_TIMEOUT_SECS", &raw)?)),
            None => None,
        };

        let max_upload_mb: usize = match var("SHELF_EYE_MAX_UPLOAD_MB") {
            Some(raw) => parse_number("SHELF_EYE_MAX_UPLOAD_MB", &raw)?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };
        if max_upload_mb.checked_mul(BYTES_PER_MB).is_none() {
            return Err(AppError::invalid_config(format!(
                "SHELF_EYE_MAX_UPLOAD_MB is too large: {}",
                max_upload_mb
            )));
        }

        // Hosting platforms set PORT; SHELF_EYE_PORT is for local runs
        let port = match var("PORT").or_else(|| var("SHELF_EYE_PORT")) {
            Some(raw) => parse_number("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            gemini: GeminiConfig {
                api_key,
                model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                base_url: var("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                timeout,
            },
            reference_dir: var("SHELF_EYE_REFERENCE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REFERENCE_DIR)),
            prompt_dir: var("SHELF_EYE_PROMPT_DIR").map(PathBuf::from),
            max_upload_mb,
            host: var("SHELF_EYE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    pub fn bind_addr(&self) -> AppResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| AppError::invalid_config(format!("Invalid bind address {}:{}", self.host, self.port)))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(BYTES_PER_MB)
    }

    pub fn reference_image_path(&self) -> PathBuf {
        self.reference_dir.join(REFERENCE_IMAGE_FILE)
    }

    pub fn reference_layout_path(&self) -> PathBuf {
        self.reference_dir.join(REFERENCE_LAYOUT_FILE)
    }

    pub fn standard_prices_path(&self) -> PathBuf {
        self.reference_dir.join(STANDARD_PRICES_FILE)
    }

    pub fn prompt_dir(&self) -> Option<&Path> {
        self.prompt_dir.as_deref()
    }
}

const BYTES_PER_MB: usize = 1024 * 1024;

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::invalid_config(format!("{} must be a number, got {:?}", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.gemini.timeout, None);
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes(), 20 * 1024 * 1024);
        assert_eq!(
            config.reference_layout_path(),
            PathBuf::from("backend_reference/layout.json")
        );
        assert_eq!(
            config.reference_image_path(),
            PathBuf::from("backend_reference/correct_shelf.jpg")
        );
        assert!(config.prompt_dir().is_none());
    }

    #[test]
    fn test_missing_api_key() {
        let err = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigMissingEnv);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("GEMINI_BASE_URL", "http://localhost:9999/v1beta/"),
            ("GEMINI_TIMEOUT_SECS", "45"),
            ("SHELF_EYE_REFERENCE_DIR", "/srv/ref"),
            ("SHELF_EYE_PORT", "9000"),
        ]))
        .unwrap();

        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.gemini.base_url, "http://localhost:9999/v1beta");
        assert_eq!(config.gemini.timeout, Some(Duration::from_secs(45)));
        assert_eq!(config.standard_prices_path(), PathBuf::from("/srv/ref/standard_prices.json"));
        assert_eq!(config.bind_addr().unwrap().port(), 9000);
    }

    #[test]
    fn test_platform_port_wins() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("PORT", "3000"),
            ("SHELF_EYE_PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_number() {
        let err = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("SHELF_EYE_MAX_UPLOAD_MB", "lots"),
        ]))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn test_upload_limit_overflow() {
        let huge = usize::MAX.to_string();
        let err = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("SHELF_EYE_MAX_UPLOAD_MB", huge.as_str()),
        ]))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);

        let config = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("SHELF_EYE_MAX_UPLOAD_MB", "5"),
        ]))
        .unwrap();
        assert_eq!(config.max_upload_bytes(), 5 * 1024 * 1024);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "super-secret")])).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
