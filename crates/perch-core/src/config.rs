//! Client configuration
//!
//! Resolution order: explicit TOML file (if given), then environment
//! variables, then defaults. The API key has no default and must come
//! from one of the first two.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "PERCH_API_KEY";
/// Environment variable overriding the API base URL
pub const BASE_URL_ENV: &str = "PERCH_BASE_URL";

const DEFAULT_BASE_URL: &str = "https://api.perchlabs.dev";

/// Connection settings for the Perch API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Perch API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key used for all calls made before the handoff exchange
    #[serde(default)]
    pub api_key: String,
}

impl ApiConfig {
    /// Load configuration from the environment only
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| Error::Config(format!("{} is not set", API_KEY_ENV)))?;
        if api_key.trim().is_empty() {
            return Err(Error::Config(format!("{} is empty", API_KEY_ENV)));
        }

        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self { base_url, api_key })
    }

    /// Load configuration from a TOML file, letting environment
    /// variables fill in anything the file leaves out
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut config: ApiConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid config file: {}", e)))?;

        if config.api_key.is_empty() {
            config.api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        }
        if config.api_key.trim().is_empty() {
            return Err(Error::Config(format!(
                "no API key in {} and {} is not set",
                path.display(),
                API_KEY_ENV
            )));
        }

        Ok(config)
    }

    /// Load from an explicit file if given, otherwise from the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_file_with_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"https://staging.perchlabs.dev\"").unwrap();
        writeln!(file, "api_key = \"pk_test\"").unwrap();

        let config = ApiConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "https://staging.perchlabs.dev");
        assert_eq!(config.api_key, "pk_test");
    }

    #[test]
    fn test_config_file_defaults_base_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = \"pk_test\"").unwrap();

        let config = ApiConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = ApiConfig::from_file(Path::new("/nonexistent/perch.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = [not toml").unwrap();

        let result = ApiConfig::from_file(file.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
