//! Centralized configuration management for formfetch

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};

/// Environment variable holding the API base address
pub const API_BASE_VAR: &str = "FORMFETCH_API_BASE";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base address prepended to every request path
    pub api_base: ApiBase,
    /// Persisted token store settings
    pub token: TokenConfig,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// Where the API base address comes from.
///
/// `FromEnv` is resolved on every dispatch, so a controller that lives for
/// the whole process still picks up a changed value.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiBase {
    Fixed(String),
    FromEnv { var: String, fallback: String },
}

/// Token store configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Path of the JSON key-value file holding the token
    pub store_path: PathBuf,
    /// Key the token is stored under
    pub key: String,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl ApiBase {
    pub fn resolve(&self) -> String {
        match self {
            ApiBase::Fixed(base) => base.clone(),
            ApiBase::FromEnv { var, fallback } => {
                std::env::var(var).unwrap_or_else(|_| fallback.clone())
            }
        }
    }

    /// Join the base address and a request path by plain concatenation
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.resolve(), path)
    }
}

impl Default for ApiBase {
    fn default() -> Self {
        ApiBase::FromEnv {
            var: API_BASE_VAR.to_string(),
            fallback: String::new(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("./formfetch-storage.json"),
            key: "token".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: ApiBase::default(),
            token: TokenConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "formfetch/0.1.0".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let store_path = std::env::var("FORMFETCH_TOKEN_STORE")
            .unwrap_or_else(|_| "./formfetch-storage.json".to_string())
            .into();

        let key = std::env::var("FORMFETCH_TOKEN_KEY")
            .unwrap_or_else(|_| "token".to_string());

        let http = HttpConfig {
            timeout_seconds: parse_env_var("FORMFETCH_HTTP_TIMEOUT_SECONDS")?.unwrap_or(30),
            user_agent: std::env::var("FORMFETCH_USER_AGENT")
                .unwrap_or_else(|_| "formfetch/0.1.0".to_string()),
        };

        Ok(Config {
            api_base: ApiBase::default(),
            token: TokenConfig { store_path, key },
            http,
        })
    }

    /// Override the base address with a fixed value
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = ApiBase::Fixed(base.to_string());
        self
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("HTTP timeout must be greater than zero"));
        }

        if self.token.key.is_empty() {
            return Err(anyhow::anyhow!("Token key must not be empty"));
        }

        if let Some(parent) = self.token.store_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(anyhow::anyhow!(
                    "Token store parent directory does not exist: {}",
                    parent.display()
                ));
            }
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
