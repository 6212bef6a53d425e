//! core::config
//!
//! Configuration loading and resolution.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Environment (`BACKEND_API_URL`)
//! 4. CLI flags (passed in as [`ConfigOverrides`])
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$CHANGELOG_PORTAL_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/changelog-portal/config.toml`
//! 3. `~/.changelog-portal/config.toml` (canonical write location)
//!
//! # Resolve Once
//!
//! The binary loads and resolves configuration a single time at startup into
//! a [`Settings`] value, which is then passed explicitly to the proxy and the
//! workflows. Nothing reads the environment per request.
//!
//! # Example
//!
//! ```no_run
//! use changelog_portal::core::config::{Config, ConfigOverrides};
//!
//! let result = Config::load().unwrap();
//! let settings = result
//!     .config
//!     .resolve(&ConfigOverrides::default())
//!     .unwrap();
//! println!("Backend: {}", settings.backend_url);
//! ```

pub mod schema;

pub use schema::{PaginationConfig, PollingConfig, PortalConfig, ServerConfig};

use std::fs;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CHANGELOG_PORTAL_CONFIG";

/// Environment variable overriding the backend base URL.
pub const BACKEND_URL_ENV: &str = "BACKEND_API_URL";

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";
pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_VIEWER_URL: &str = "http://localhost:3000/";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 150;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: Config,
    pub warnings: Vec<ConfigWarning>,
}

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub api_url: Option<String>,
    pub bind: Option<String>,
}

/// Config file contents plus environment, before CLI overrides.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed config file (defaults if none was found)
    pub file: PortalConfig,
    /// `BACKEND_API_URL`, if set and non-empty
    env_backend_url: Option<String>,
    /// Path the file was loaded from
    file_path: Option<PathBuf>,
}

/// Fully resolved, validated settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub backend_url: String,
    pub api_url: String,
    pub viewer_url: String,
    pub bind: SocketAddr,
    pub commits_page_size: u32,
    pub changelogs_page_size: u32,
    #[serde(with = "millis")]
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    #[serde(with = "opt_millis")]
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from the process environment and default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or holds
    /// invalid values. A missing file is not an error.
    pub fn load() -> Result<ConfigLoadResult, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// Load configuration using the given environment lookup and home dir.
    pub fn load_with<F>(env: F, home: Option<PathBuf>) -> Result<ConfigLoadResult, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();

        let (file, file_path) = Self::load_file(&env, home.as_deref(), &mut warnings)?;
        file.validate()?;

        let env_backend_url = env(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty());

        Ok(ConfigLoadResult {
            config: Config {
                file,
                env_backend_url,
                file_path,
            },
            warnings,
        })
    }

    fn load_file<F>(
        env: &F,
        home: Option<&Path>,
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(PortalConfig, Option<PathBuf>), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 1. Explicit path
        if let Some(path) = env(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
            warnings.push(ConfigWarning {
                message: format!(
                    "{} points at '{}', which does not exist; using defaults",
                    CONFIG_ENV,
                    path.display()
                ),
            });
        }

        // 2. XDG
        if let Some(xdg_home) = env("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("changelog-portal/config.toml");
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 3. Home directory
        if let Some(home) = home {
            let path = home.join(".changelog-portal/config.toml");
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((PortalConfig::default(), None))
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<PortalConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for the config file.
    ///
    /// Returns `~/.changelog-portal/config.toml`.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".changelog-portal/config.toml"))
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed. Writes to a temp file in the
    /// same directory and renames it into place.
    pub fn write_atomic(path: &Path, config: &PortalConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Get the path the config file was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    // =========================================================================
    // Accessors with precedence
    // =========================================================================

    /// Backend base URL: CLI > `BACKEND_API_URL` > file > default.
    pub fn backend_url<'a>(&'a self, overrides: &'a ConfigOverrides) -> &'a str {
        overrides
            .backend_url
            .as_deref()
            .or(self.env_backend_url.as_deref())
            .or(self.file.backend_url.as_deref())
            .unwrap_or(DEFAULT_BACKEND_URL)
    }

    /// API base URL used by the terminal workflows.
    pub fn api_url<'a>(&'a self, overrides: &'a ConfigOverrides) -> &'a str {
        overrides
            .api_url
            .as_deref()
            .or(self.file.api_url.as_deref())
            .unwrap_or(DEFAULT_API_URL)
    }

    pub fn viewer_url(&self) -> &str {
        self.file.viewer_url.as_deref().unwrap_or(DEFAULT_VIEWER_URL)
    }

    pub fn bind<'a>(&'a self, overrides: &'a ConfigOverrides) -> &'a str {
        overrides
            .bind
            .as_deref()
            .or(self.file.server.as_ref().and_then(|s| s.bind.as_deref()))
            .unwrap_or(DEFAULT_BIND)
    }

    pub fn commits_page_size(&self) -> u32 {
        self.file
            .pagination
            .as_ref()
            .and_then(|p| p.commits_page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn changelogs_page_size(&self) -> u32 {
        self.file
            .pagination
            .as_ref()
            .and_then(|p| p.changelogs_page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.file
                .polling
                .as_ref()
                .and_then(|p| p.interval_ms)
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        )
    }

    pub fn max_poll_attempts(&self) -> u32 {
        self.file
            .polling
            .as_ref()
            .and_then(|p| p.max_attempts)
            .unwrap_or(DEFAULT_MAX_POLL_ATTEMPTS)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.file.request_timeout_ms.map(Duration::from_millis)
    }

    /// Apply CLI overrides and validate the result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if an overridden or environment
    /// value is invalid.
    pub fn resolve(&self, overrides: &ConfigOverrides) -> Result<Settings, ConfigError> {
        let backend_url = trim_trailing_slash(self.backend_url(overrides));
        let api_url = trim_trailing_slash(self.api_url(overrides));
        schema::validate_url("backend_url", &backend_url)?;
        schema::validate_url("api_url", &api_url)?;

        let viewer_url = self.viewer_url().to_string();
        schema::validate_url("viewer_url", &viewer_url)?;

        Ok(Settings {
            backend_url,
            api_url,
            viewer_url,
            bind: schema::parse_bind(self.bind(overrides))?,
            commits_page_size: self.commits_page_size(),
            changelogs_page_size: self.changelogs_page_size(),
            poll_interval: self.poll_interval(),
            max_poll_attempts: self.max_poll_attempts(),
            request_timeout: self.request_timeout(),
        })
    }
}

fn trim_trailing_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(value.as_millis() as u64)
    }
}

mod opt_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }
}
