//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOP_API_URL` - Base URL of the shopping backend (default: <http://localhost:8080>)

use url::Url;

use thiserror::Error;

/// Backend address used when `SHOP_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

const API_URL_VAR: &str = "SHOP_API_URL";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid API URL {0}: {1}")]
    InvalidApiUrl(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, always without a trailing slash.
    pub api_url: String,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `SHOP_API_URL` is set but is
    /// not an absolute http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let raw = get_env_or_default(API_URL_VAR, DEFAULT_API_URL);
        let api_url = parse_api_url(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar(API_URL_VAR.to_string(), e))?;

        Ok(Self { api_url })
    }

    /// Build a configuration for an explicit backend URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidApiUrl` if the URL is not an absolute
    /// http(s) URL.
    pub fn with_api_url(api_url: &str) -> Result<Self, ConfigError> {
        let api_url = parse_api_url(api_url)
            .map_err(|e| ConfigError::InvalidApiUrl(api_url.to_string(), e))?;
        Ok(Self { api_url })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate a backend URL and normalize away the trailing slash.
fn parse_api_url(raw: &str) -> Result<String, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err("must not contain a query or fragment".to_string());
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_url_strips_trailing_slash() {
        assert_eq!(
            parse_api_url("http://localhost:8080/").as_deref(),
            Ok("http://localhost:8080")
        );
        assert_eq!(
            parse_api_url("https://shop.example.com/api/").as_deref(),
            Ok("https://shop.example.com/api")
        );
    }

    #[test]
    fn test_parse_api_url_rejects_other_schemes() {
        assert!(parse_api_url("ftp://localhost").is_err());
        assert!(parse_api_url("localhost:8080").is_err());
    }

    #[test]
    fn test_parse_api_url_rejects_garbage() {
        assert!(parse_api_url("not a url").is_err());
        assert!(parse_api_url("").is_err());
    }

    #[test]
    fn test_parse_api_url_rejects_query() {
        assert!(parse_api_url("http://localhost:8080/?debug=1").is_err());
    }

    #[test]
    fn test_with_api_url_reports_input() {
        let err = ClientConfig::with_api_url("nope").expect_err("invalid url");
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_default_points_at_local_backend() {
        assert_eq!(ClientConfig::default().api_url, DEFAULT_API_URL);
    }
}
