//! Configuration management for IssueDesk
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! Credentials never live here; only the server address and where the
//! session is kept.

use crate::error::{IssueDeskError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

/// Main configuration structure for IssueDesk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Session persistence settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the issue service (scheme, host and port)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional per-request timeout (seconds)
    ///
    /// When unset, requests only time out when the platform gives up.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8889".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
        }
    }
}

impl ApiConfig {
    /// Parses the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDeskError::Config`] if the URL is not absolute http(s).
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            IssueDeskError::Config(format!("Invalid base_url {:?}: {}", self.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(IssueDeskError::Config(format!(
                "base_url must use http or https, got {}",
                url.scheme()
            )));
        }
        Ok(url)
    }
}

/// Where the session is persisted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackend {
    /// OS credential store
    Keyring,
    /// Embedded database in the data directory
    #[default]
    File,
    /// In-process only; forgotten on exit
    Memory,
}

impl FromStr for SessionBackend {
    type Err = IssueDeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "keyring" => Ok(Self::Keyring),
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(IssueDeskError::Config(format!(
                "Invalid session backend: {}. Must be one of: keyring, file, memory",
                other
            ))),
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Storage backend
    #[serde(default)]
    pub backend: SessionBackend,

    /// Profile name; separates sessions of different accounts or servers
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Directory for the file backend (defaults to the platform data dir)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_profile() -> String {
    "default".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::default(),
            profile: default_profile(),
            path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| IssueDeskError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| IssueDeskError::Config(format!("Failed to parse config: {}", e)))
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("ISSUEDESK_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("ISSUEDESK_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = Some(value);
            } else {
                tracing::warn!("Invalid ISSUEDESK_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(backend) = std::env::var("ISSUEDESK_SESSION_BACKEND") {
            match backend.parse() {
                Ok(value) => self.session.backend = value,
                Err(_) => tracing::warn!(
                    "Invalid ISSUEDESK_SESSION_BACKEND: {}, keeping {:?}",
                    backend,
                    self.session.backend
                ),
            }
        }

        if let Ok(profile) = std::env::var("ISSUEDESK_SESSION_PROFILE") {
            self.session.profile = profile;
        }

        if let Ok(path) = std::env::var("ISSUEDESK_SESSION_PATH") {
            tracing::debug!(path = %path, "Env override: ISSUEDESK_SESSION_PATH");
            self.session.path = Some(PathBuf::from(path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(server) = &cli.server {
            self.api.base_url = server.clone();
        }
        if let Some(backend) = cli.store {
            self.session.backend = backend;
        }
        if let Some(profile) = &cli.profile {
            self.session.profile = profile.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        self.api.parsed_base_url()?;

        if self.api.timeout_seconds == Some(0) {
            return Err(IssueDeskError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.session.profile.trim().is_empty() {
            return Err(IssueDeskError::Config(
                "session.profile cannot be empty".to_string(),
            ));
        }

        if self
            .session
            .profile
            .chars()
            .any(|c| c == '/' || c == '\\')
        {
            return Err(IssueDeskError::Config(format!(
                "session.profile must not contain path separators: {}",
                self.session.profile
            )));
        }

        Ok(())
    }
}
