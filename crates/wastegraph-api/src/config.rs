//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files: bind address, database location,
//! history page size and log level.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Field present but unusable
    #[error("Invalid configuration field {field}: {reason}")]
    InvalidField {
        /// Field name
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// SQLite database file (default: "wastegraph.db")
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Records returned by the history endpoint when no limit is given
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Default tracing filter, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database_path() -> String {
    "wastegraph.db".to_string()
}

fn default_history_limit() -> usize {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;

        if config.database_path.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "database_path".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }
        if config.history_limit == 0 {
            return Err(ConfigError::InvalidField {
                field: "history_limit".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(config)
    }

    /// Create a default configuration for local development and tests
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            database_path: default_database_path(),
            history_limit: default_history_limit(),
            log_level: default_log_level(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.bind_port, 8080);
        assert_eq!(config.database_path, "wastegraph.db");
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            database_path = "/var/lib/wastegraph/network.db"
            history_limit = 50
            log_level = "debug"
        "#;

        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.database_path, "/var/lib/wastegraph/network.db");
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_parse_toml_defaults() {
        let toml = r#"
            bind_address = "127.0.0.1"
            bind_port = 3000
        "#;

        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.database_path, "wastegraph.db");
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_from_file_rejects_zero_history_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "bind_address = \"127.0.0.1\"\nbind_port = 3000\nhistory_limit = 0"
        )
        .unwrap();

        let result = ServerConfig::from_file(file.path());
        assert!(matches!(
            result,
            Err(ConfigError::InvalidField { ref field, .. }) if field == "history_limit"
        ));
    }

    #[test]
    fn test_from_file_missing() {
        let result = ServerConfig::from_file("/nonexistent/wastegraph.toml");
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }
}
