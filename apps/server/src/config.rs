//! # Server Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     LOANTRACK_BIND_ADDR=0.0.0.0:8080                                   │
//! │     LOANTRACK_DB_PATH=/var/lib/loantrack/loantrack.db                  │
//! │     LOANTRACK_DEFAULT_BORROWER=<user id>                               │
//! │     LOANTRACK_MAX_CONNECTIONS=5                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/loantrack/loantrack.toml (Linux)                         │
//! │     ~/Library/Application Support/com.loantrack.loantrack/ (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! bind_addr = "127.0.0.1:8080"
//!
//! [database]
//! path = "/var/lib/loantrack/loantrack.db"
//! max_connections = 5
//!
//! [loans]
//! default_borrower_id = "00000000-0000-0000-0000-000000000000"
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use loantrack_core::DEFAULT_BORROWER_ID;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

const CONFIG_FILE_NAME: &str = "loantrack.toml";
const DATABASE_FILE_NAME: &str = "loantrack.db";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Sections
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Listen address.
    /// Default: 127.0.0.1:8080
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Pool size.
    /// Default: 5
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Loan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSettings {
    /// Borrower recorded when a request carries no `x-user-id` header.
    #[serde(default = "default_borrower_id")]
    pub default_borrower_id: String,
}

fn default_borrower_id() -> String {
    DEFAULT_BORROWER_ID.to_string()
}

impl Default for LoanSettings {
    fn default() -> Self {
        LoanSettings {
            default_borrower_id: default_borrower_id(),
        }
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub loans: LoanSettings,
}

impl ServerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (loantrack.toml)
    /// 3. Environment variables
    ///
    /// An explicitly given path must exist; the default path is optional.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(&path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `LOANTRACK_*` overrides from the given lookup.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("LOANTRACK_BIND_ADDR") {
            debug!(addr = %addr, "Overriding bind address from environment");
            self.server.bind_addr = addr;
        }

        if let Some(path) = lookup("LOANTRACK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(id) = lookup("LOANTRACK_DEFAULT_BORROWER") {
            self.loans.default_borrower_id = id;
        }

        if let Some(max) = lookup("LOANTRACK_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid LOANTRACK_MAX_CONNECTIONS"),
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.loans.default_borrower_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_borrower_id must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind_addr.parse().map_err(|_| {
            ConfigError::Invalid(format!(
                "bind_addr must be host:port, got: {}",
                self.server.bind_addr
            ))
        })
    }

    /// Database file to open.
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "loantrack", "loantrack")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.loans.default_borrower_id, DEFAULT_BORROWER_ID);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [database]
            path = "/tmp/loans.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path(), PathBuf::from("/tmp/loans.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LOANTRACK_BIND_ADDR", "0.0.0.0:9000"),
            ("LOANTRACK_DEFAULT_BORROWER", "kiosk"),
            ("LOANTRACK_MAX_CONNECTIONS", "not-a-number"),
        ]);

        let mut config = ServerConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.loans.default_borrower_id, "kiosk");
        // Invalid numbers are ignored
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_validation() {
        let mut config = ServerConfig::default();
        config.server.bind_addr = "localhost".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ServerConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.loans.default_borrower_id = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = ServerConfig::load(Some(PathBuf::from("/nonexistent/loantrack.toml")));
        assert!(matches!(err, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&ServerConfig::default()).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[loans]"));
    }
}
