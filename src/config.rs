//! Configuration loading and types.
//!
//! Configuration is read from a YAML file and deserialized into the
//! [`Config`] struct. Every field has a default, and a missing file falls
//! back to the defaults entirely, so `mockcdn` starts with no setup.

use std::path::Path;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Seeded authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind host address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port. 0 picks a free port, which suits test harnesses.
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

/// Seeded credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// API key registered for the seeded fixture user.
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
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

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    0
}

fn default_api_key() -> String {
    "mockcdn-api-key".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from a YAML file. A missing file yields the
/// defaults; a present but malformed file is an error.
pub fn load_config(path: &str) -> anyhow::Result<Config> {
    if !Path::new(path).exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 0);
        assert_eq!(config.auth.api_key, "mockcdn-api-key");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: Config = serde_yaml::from_str("server:\n  port: 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.auth.api_key, "mockcdn-api-key");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config("/nonexistent/mockcdn.yaml").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
