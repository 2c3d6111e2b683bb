//! Environment-driven configuration.
//!
//! ## Variables
//!
//! - `HOST`: Bind host (default: 0.0.0.0)
//! - `PORT`: Bind port (default: 3000)
//! - `OPENAI_API_KEY`: Provider credential (unset → mock provider)
//! - `OPENAI_MODEL`: Model identifier (default: gpt-3.5-turbo)
//! - `OPENAI_BASE_URL`: API root (default: https://api.openai.com/v1)
//! - `OPENAI_TIMEOUT_SECS`: Request timeout (default: 30)
//!
//! Postgres settings live with the store, see `store::postgres::PostgresConfig`.

use std::net::SocketAddr;

/// Default bind port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default provider API root.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default provider request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("Invalid value for {name}: {value}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },

    /// Host and port do not form a socket address.
    #[error("Invalid listen address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            value.trim().parse().map_err(|_| ConfigError::InvalidValue { name, value })
        }
        _ => Ok(default),
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl ServiceConfig {
    /// Load from `HOST` and `PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", DEFAULT_PORT)?,
        })
    }

    /// Socket address to bind.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Completion provider configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct OpenAiConfig {
    /// Bearer credential.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// API root, without trailing slash.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// Config with the given key and defaults for everything else.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load from the environment.
    ///
    /// Returns `Ok(None)` when `OPENAI_API_KEY` is unset or empty.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let api_key = match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => return Ok(None),
        };

        let model = std::env::var("OPENAI_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        Ok(Some(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: parse_var("OPENAI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        }))
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

// Keep the credential out of logs.
impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_addr() {
        let config = ServiceConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        };
        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_listen_addr_rejects_garbage_host() {
        let config = ServiceConfig {
            host: "not a host".to_string(),
            port: 8080,
        };
        assert!(config.listen_addr().is_err());
    }

    #[test]
    fn test_openai_config_builders() {
        let config = OpenAiConfig::new("sk-test")
            .with_model("gpt-4o-mini")
            .with_base_url("http://localhost:8080/v1/");

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", OpenAiConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
