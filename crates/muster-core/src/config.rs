//! Configuration management for muster

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::liveness::DEFAULT_POLL_WINDOW;

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("muster")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a file
pub fn save_config<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}

/// Configuration for the control-plane server daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the HTTP/WebSocket server to
    pub bind_address: String,

    /// Shared secret operators present at login
    pub admin_password: String,

    /// Polling window for the responsiveness classification: agents whose
    /// last report is older than this are listed as unresponsive
    #[serde(with = "duration_secs")]
    pub poll_window: Duration,

    /// Bound on each agent connection's outbound command queue.
    /// A full queue means delivery fails fast instead of stalling dispatch.
    pub command_queue_depth: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            admin_password: String::new(),
            poll_window: DEFAULT_POLL_WINDOW,
            command_queue_depth: 64,
        }
    }
}

impl ServerConfig {
    /// Check that the configuration is usable.
    ///
    /// The shared secret has no usable default; refusing to start without
    /// one beats accepting every login.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_password.is_empty() {
            return Err(ConfigError::MissingField("admin_password".to_string()));
        }
        if self.command_queue_depth == 0 {
            return Err(ConfigError::Invalid(
                "command_queue_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// Helper module for Duration serialization as whole seconds
mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_fails_validation() {
        let config = ServerConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField(_))
        ));
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = ServerConfig::default();
        config.admin_password = "correct-horse".to_string();
        config.poll_window = Duration::from_secs(30);

        save_config(&path, &config).unwrap();
        let loaded: ServerConfig = load_config(&path).unwrap();

        assert_eq!(loaded.bind_address, config.bind_address);
        assert_eq!(loaded.admin_password, "correct-horse");
        assert_eq!(loaded.poll_window, Duration::from_secs(30));
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let result: Result<ServerConfig, _> =
            load_config(Path::new("/nonexistent/muster/config.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ServerConfig =
            toml::from_str("admin_password = \"secret\"").unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8000");
        assert_eq!(config.poll_window, DEFAULT_POLL_WINDOW);
        assert_eq!(config.command_queue_depth, 64);
        assert!(config.validate().is_ok());
    }
}
