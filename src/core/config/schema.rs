//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Location
//!
//! Searched in order:
//! 1. `$CHANGELOG_PORTAL_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/changelog-portal/config.toml`
//! 3. `~/.changelog-portal/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Values are validated after parsing: URLs must be absolute http(s),
//! sizes and intervals must be positive, the bind address must parse.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Configuration file contents.
///
/// # Example
///
/// ```toml
/// backend_url = "http://localhost:3001"
/// api_url = "http://localhost:3000"
/// viewer_url = "http://localhost:3000/"
/// request_timeout_ms = 30000
///
/// [server]
/// bind = "127.0.0.1:3000"
///
/// [pagination]
/// commits_page_size = 10
/// changelogs_page_size = 10
///
/// [polling]
/// interval_ms = 2000
/// max_attempts = 150
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PortalConfig {
    /// Base URL of the changelog backend service
    pub backend_url: Option<String>,

    /// Base URL the terminal workflows talk to (the proxy, usually)
    pub api_url: Option<String>,

    /// Public changelog viewer URL
    pub viewer_url: Option<String>,

    /// Timeout for outbound requests; unset means no timeout
    pub request_timeout_ms: Option<u64>,

    /// Proxy server settings
    pub server: Option<ServerConfig>,

    /// Page sizes
    pub pagination: Option<PaginationConfig>,

    /// Generation polling
    pub polling: Option<PollingConfig>,
}

impl PortalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("backend_url", &self.backend_url),
            ("api_url", &self.api_url),
            ("viewer_url", &self.viewer_url),
        ] {
            if let Some(url) = value {
                validate_url(key, url)?;
            }
        }

        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue(
                "request_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if let Some(server) = &self.server {
            server.validate()?;
        }
        if let Some(pagination) = &self.pagination {
            pagination.validate()?;
        }
        if let Some(polling) = &self.polling {
            polling.validate()?;
        }

        Ok(())
    }
}

/// Proxy server settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to listen on (default: 127.0.0.1:3000)
    pub bind: Option<String>,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(bind) = &self.bind {
            parse_bind(bind)?;
        }
        Ok(())
    }
}

/// Page sizes for the commit browser and changelog viewer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    pub commits_page_size: Option<u32>,
    pub changelogs_page_size: Option<u32>,
}

impl PaginationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.commits_page_size == Some(0) {
            return Err(ConfigError::InvalidValue(
                "pagination.commits_page_size must be greater than 0".to_string(),
            ));
        }
        if self.changelogs_page_size == Some(0) {
            return Err(ConfigError::InvalidValue(
                "pagination.changelogs_page_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Generation status polling.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PollingConfig {
    /// Delay between status requests
    pub interval_ms: Option<u64>,

    /// Status requests before giving up
    pub max_attempts: Option<u32>,
}

impl PollingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == Some(0) {
            return Err(ConfigError::InvalidValue(
                "polling.interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(ConfigError::InvalidValue(
                "polling.max_attempts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Check that a URL is absolute http(s) with a host.
pub fn validate_url(key: &str, url: &str) -> Result<(), ConfigError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| ConfigError::InvalidValue(format!("{} '{}': {}", key, url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue(format!(
            "{} '{}' must use http or https",
            key, url
        )));
    }
    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidValue(format!(
            "{} '{}' has no host",
            key, url
        )));
    }
    Ok(())
}

/// Parse a listen address.
pub fn parse_bind(bind: &str) -> Result<SocketAddr, ConfigError> {
    bind.parse()
        .map_err(|_| ConfigError::InvalidValue(format!("invalid server.bind '{}'", bind)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_valid() {
        assert!(PortalConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_full_example() {
        let config: PortalConfig = toml::from_str(
            r#"
            backend_url = "http://localhost:3001"
            viewer_url = "https://changelog.example.com/"

            [server]
            bind = "0.0.0.0:8080"

            [pagination]
            commits_page_size = 25

            [polling]
            interval_ms = 500
            max_attempts = 10
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(
            config.pagination.as_ref().and_then(|p| p.commits_page_size),
            Some(25)
        );
        assert_eq!(config.polling.as_ref().and_then(|p| p.max_attempts), Some(10));
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<PortalConfig, _> = toml::from_str("backend = \"http://x\"");
        assert!(result.is_err());

        let nested: Result<PortalConfig, _> = toml::from_str("[polling]\nevery = 3");
        assert!(nested.is_err());
    }

    #[test]
    fn relative_url_rejected() {
        let config = PortalConfig {
            backend_url: Some("localhost:3001/api".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_url_rejected() {
        let err = validate_url("backend_url", "ftp://example.com").unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn zero_values_rejected() {
        let polling = PollingConfig {
            interval_ms: Some(0),
            max_attempts: None,
        };
        assert!(polling.validate().is_err());

        let attempts = PollingConfig {
            interval_ms: None,
            max_attempts: Some(0),
        };
        assert!(attempts.validate().is_err());

        let pages = PaginationConfig {
            commits_page_size: None,
            changelogs_page_size: Some(0),
        };
        assert!(pages.validate().is_err());

        let timeout = PortalConfig {
            request_timeout_ms: Some(0),
            ..Default::default()
        };
        assert!(timeout.validate().is_err());
    }

    #[test]
    fn bad_bind_rejected() {
        let server = ServerConfig {
            bind: Some("not-an-address".to_string()),
        };
        assert!(server.validate().is_err());
        assert!(parse_bind("127.0.0.1:3000").is_ok());
    }
}
