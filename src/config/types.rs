//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use super::defaults::{default_database_path, default_metrics_port};
use super::limits::LimitsConfig;
use super::security::SecurityConfig;
use super::throttle::ThrottleConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server information.
    pub server: ServerConfig,
    /// Network listen configuration.
    pub listen: ListenConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Connection and framing limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Session guard and admission control.
    #[serde(default)]
    pub security: SecurityConfig,
    /// Per-command cooldowns.
    #[serde(default)]
    pub throttle: ThrottleConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Role of this process in the login/world split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerKind {
    /// Verifies account passwords and hands out login keys.
    Login,
    /// Verifies login keys and hosts gameplay.
    World,
}

impl ServerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::World => "world",
        }
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Numeric server id, unique across the deployment.
    pub id: u32,
    /// Display name (e.g., "Blizzard").
    pub name: String,
    /// Login or world server.
    pub kind: ServerKind,
    /// Prometheus metrics HTTP port (default: 9090, 0 disables).
    #[serde(default = "default_metrics_port")]
    pub metrics_port: Option<u16>,
}

/// Client listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind.
    pub address: SocketAddr,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
[server]
id = 100
name = "Blizzard"
kind = "world"

[listen]
address = "127.0.0.1:9875"
"#;

    #[test]
    fn minimal_config_fills_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.server.kind, ServerKind::World);
        assert_eq!(config.server.metrics_port, Some(9090));
        assert_eq!(config.database.path, "onyx.db");
        assert_eq!(config.limits.max_connections, 256);
        assert_eq!(config.security.violation_code, 800);
        assert_eq!(config.throttle.cooldown("u#sg"), Some(5));
    }

    #[test]
    fn server_kind_is_lowercase() {
        let toml = MINIMAL.replace("\"world\"", "\"login\"");
        let config: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.server.kind, ServerKind::Login);
        assert_eq!(config.server.kind.as_str(), "login");

        let toml = MINIMAL.replace("\"world\"", "\"World\"");
        assert!(toml::from_str::<Config>(&toml).is_err());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.name, "Blizzard");
        assert_eq!(config.listen.address.port(), 9875);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load("/nonexistent/onyx.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn load_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[server\nid = ").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
