//! Configuration structures for linelog

use crate::{LineLogError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default TCP endpoint the server listens on
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Default mailbox capacity
pub const DEFAULT_MAILBOX_CAPACITY: usize = 10;

/// Default log file path
pub const DEFAULT_LOG_FILE: &str = "data.txt";

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Core server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// TCP address (host:port) to bind to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Number of messages the mailbox buffers before readers suspend
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    /// Maximum concurrent connections; unlimited when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<usize>,
    /// Seconds a connection may stay silent before it is closed; no limit when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,
    /// Longest line in bytes, terminator included; a longer line closes the connection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_line_bytes: Option<usize>,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Append-only log file receiving one entry per message
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_mailbox_capacity() -> usize {
    DEFAULT_MAILBOX_CAPACITY
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            mailbox_capacity: default_mailbox_capacity(),
            max_connections: None,
            idle_timeout_secs: None,
            max_line_bytes: None,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
        }
    }
}

impl ServerSettings {
    /// Idle timeout as a [`Duration`], if one is configured
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LineLogError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string without validating it
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| LineLogError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.listen_addr.trim().is_empty() {
            return Err(LineLogError::Config("Listen address cannot be empty".to_string()));
        }
        if self.server.mailbox_capacity == 0 {
            return Err(LineLogError::Config(
                "Mailbox capacity must be greater than zero".to_string(),
            ));
        }
        if self.server.max_connections == Some(0) {
            return Err(LineLogError::Config(
                "max_connections must be greater than zero when set".to_string(),
            ));
        }
        if self.server.idle_timeout_secs == Some(0) {
            return Err(LineLogError::Config(
                "idle_timeout_secs must be greater than zero when set".to_string(),
            ));
        }
        if self.server.max_line_bytes == Some(0) {
            return Err(LineLogError::Config(
                "max_line_bytes must be greater than zero when set".to_string(),
            ));
        }
        if self.storage.log_file.as_os_str().is_empty() {
            return Err(LineLogError::Config("Log file path cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.server.mailbox_capacity, 10);
        assert_eq!(config.server.max_connections, None);
        assert_eq!(config.server.idle_timeout(), None);
        assert_eq!(config.server.max_line_bytes, None);
        assert_eq!(config.storage.log_file, PathBuf::from("data.txt"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [server]
            listen_addr = "127.0.0.1:4000"
            mailbox_capacity = 32
            max_connections = 64
            idle_timeout_secs = 30
            max_line_bytes = 4096

            [storage]
            log_file = "/tmp/linelog.txt"
        "#;

        let config = ServerConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:4000");
        assert_eq!(config.server.mailbox_capacity, 32);
        assert_eq!(config.server.max_connections, Some(64));
        assert_eq!(config.server.idle_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.server.max_line_bytes, Some(4096));
        assert_eq!(config.storage.log_file, PathBuf::from("/tmp/linelog.txt"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ServerConfig::from_toml("[server]\nlisten_addr = \"127.0.0.1:9\"\n").unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:9");
        assert_eq!(config.server.mailbox_capacity, DEFAULT_MAILBOX_CAPACITY);
        assert_eq!(config.storage.log_file, PathBuf::from(DEFAULT_LOG_FILE));

        let empty = ServerConfig::from_toml("").unwrap();
        assert_eq!(empty.server.listen_addr, DEFAULT_LISTEN_ADDR);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ServerConfig::from_toml("[server\nlisten_addr = 3").unwrap_err();
        assert!(matches!(err, LineLogError::Config(_)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.server.listen_addr = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.server.mailbox_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.server.max_connections = Some(0);
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.server.idle_timeout_secs = Some(0);
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.server.max_line_bytes = Some(0);
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.storage.log_file = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let result = ServerConfig::from_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(LineLogError::Config(_))));
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        let mut config = ServerConfig::default();
        config.server.max_connections = Some(8);
        std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        let loaded = ServerConfig::from_file(&path).unwrap();
        assert_eq!(loaded.server.max_connections, Some(8));
        assert_eq!(loaded.server.idle_timeout_secs, None);
    }
}
