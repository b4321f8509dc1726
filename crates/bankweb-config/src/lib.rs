//! Configuration management for bankweb
//!
//! This module handles loading, validation, and management of
//! bankweb configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4200
}

/// Bank REST API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every gateway path is appended to (e.g. "http://localhost:8080/api/v1")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Accounts view behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Reload the account list when a dialog is cancelled
    #[serde(default = "default_true")]
    pub refresh_on_cancel: bool,
    /// Seconds an unanswered dialog is kept before it is discarded
    #[serde(default = "default_dialog_ttl_secs")]
    pub dialog_ttl_secs: u64,
    /// Most dialogs kept open at once; the oldest is discarded beyond that
    #[serde(default = "default_max_open_dialogs")]
    pub max_open_dialogs: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            refresh_on_cancel: true,
            dialog_ttl_secs: default_dialog_ttl_secs(),
            max_open_dialogs: default_max_open_dialogs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_dialog_ttl_secs() -> u64 {
    1800
}

fn default_max_open_dialogs() -> usize {
    256
}

/// Currency display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency symbol appended or prepended to amounts
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Currency symbol position ("before" or "after")
    #[serde(default)]
    pub symbol_position: SymbolPosition,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            symbol_position: SymbolPosition::After,
        }
    }
}

fn default_symbol() -> String {
    "€".to_string()
}

/// Currency symbol position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    Before,
    After,
}

impl Default for SymbolPosition {
    fn default() -> Self {
        SymbolPosition::After
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Bank API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Accounts view settings
    #[serde(default)]
    pub view: ViewConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|_| ConfigError::IoError)?;
        let config = Self::from_yaml(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        match Self::load(path.to_path_buf()) {
            Err(ConfigError::FileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        serde_yaml::from_str(content).map_err(|_| ConfigError::InvalidYaml)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "api.base_url".to_string(),
            });
        }
        // The HTTP client is built without TLS
        if !base_url.starts_with("http://") {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: "Base URL must start with http://".to_string(),
            });
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                reason: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.view.max_open_dialogs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "view.max_open_dialogs".to_string(),
                reason: "At least one dialog must be allowed".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Base URL without a trailing slash
    pub fn api_base_url(&self) -> &str {
        self.api.base_url.trim().trim_end_matches('/')
    }

    /// Bind address for the HTTP server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ==================== Tests ====================
