//! Cart store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE` - Durable backend: `memory`, `file` or `postgres` (default: file)
//! - `CART_DATA_DIR` - Directory for the file backend (default: ./data)
//! - `CART_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`),
//!   required when `CART_STORAGE=postgres`
//! - `CART_STORAGE_KEY` - Key of the durable slot (default: @gomarketplace:products)
//! - `CART_LOG_FORMAT` - `text` or `json` (default: text)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

use crate::store::DEFAULT_STORAGE_KEY;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where the durable snapshot lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// In-process only; nothing survives a restart.
    Memory,
    /// One JSON file per key under `data_dir`.
    #[default]
    File,
    /// `cart_snapshots` table (requires the `postgres` feature).
    Postgres,
}

impl StorageBackend {
    /// Parse a backend name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "file" => Some(Self::File),
            "postgres" | "postgresql" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Log output format for [`crate::telemetry::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parse a format name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Cart store configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Durable backend
    pub storage: StorageBackend,
    /// Directory for the file backend
    pub data_dir: PathBuf,
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// Key of the durable slot
    pub storage_key: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            data_dir: PathBuf::from("./data"),
            database_url: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an unknown value, or if the
    /// `postgres` backend is selected without a database URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage = get_optional_env("CART_STORAGE")
            .map(|value| {
                StorageBackend::parse(&value).ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "CART_STORAGE".to_string(),
                        format!("unknown backend '{value}' (expected memory, file or postgres)"),
                    )
                })
            })
            .transpose()?
            .unwrap_or_default();

        let log_format = get_optional_env("CART_LOG_FORMAT")
            .map(|value| {
                LogFormat::parse(&value).ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "CART_LOG_FORMAT".to_string(),
                        format!("unknown format '{value}' (expected text or json)"),
                    )
                })
            })
            .transpose()?
            .unwrap_or_default();

        let database_url = get_database_url("CART_DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("CART_DATABASE_URL".to_string()));
        }

        let storage_key = get_env_or_default("CART_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            storage,
            data_dir: PathBuf::from(get_env_or_default("CART_DATA_DIR", "./data")),
            database_url,
            storage_key,
            log_format,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(StorageBackend::parse("memory"), Some(StorageBackend::Memory));
        assert_eq!(StorageBackend::parse(" File "), Some(StorageBackend::File));
        assert_eq!(
            StorageBackend::parse("PostgreSQL"),
            Some(StorageBackend::Postgres)
        );
        assert_eq!(StorageBackend::parse("redis"), None);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("TEXT"), Some(LogFormat::Text));
        assert_eq!(LogFormat::parse("xml"), None);
    }

    #[test]
    fn test_default_config() {
        let config = CartConfig::default();
        assert_eq!(config.storage, StorageBackend::File);
        assert_eq!(config.storage_key, "@gomarketplace:products");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = CartConfig {
            database_url: Some(SecretString::from(
                "postgres://user:hunter2@db/cart".to_string(),
            )),
            ..CartConfig::default()
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
