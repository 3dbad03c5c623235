//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use onyx_proto::{COMMAND_DELIMITER, PACKET_DELIMITER};
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("limits.{0} must be greater than zero")]
    ZeroLimit(&'static str),
    #[error("security.reserved_char must not be a protocol delimiter, got '{0}'")]
    ReservedCharIsDelimiter(char),
    #[error("security.allow_reserved contains an empty command key")]
    EmptyAllowEntry,
    #[error("throttle contains an empty command key")]
    EmptyThrottleKey,
    #[error("throttle.\"{0}\" must have a cooldown greater than zero")]
    ZeroCooldown(String),
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    let limits = &config.limits;
    for (name, value) in [
        ("max_connections", limits.max_connections),
        ("max_packet_len", limits.max_packet_len),
        ("outgoing_queue", limits.outgoing_queue),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroLimit(name));
        }
    }

    let reserved = config.security.reserved_char;
    if reserved == PACKET_DELIMITER || reserved == COMMAND_DELIMITER || reserved == '\0' {
        errors.push(ValidationError::ReservedCharIsDelimiter(reserved));
    }
    if config.security.allow_reserved.iter().any(|k| k.is_empty()) {
        errors.push(ValidationError::EmptyAllowEntry);
    }

    for (key, cooldown) in config.throttle.iter() {
        if key.is_empty() {
            errors.push(ValidationError::EmptyThrottleKey);
        } else if cooldown == 0 {
            errors.push(ValidationError::ZeroCooldown(key.to_string()));
        }
    }

    let db_path = Path::new(&config.database.path);
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::DatabasePathInvalid(config.database.path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_valid_config() -> String {
        r#"
[server]
id = 1
name = "Blizzard"
kind = "world"

[listen]
address = "127.0.0.1:9875"
"#
        .to_string()
    }

    #[test]
    fn test_valid_config_passes() {
        let config: Config = toml::from_str(&minimal_valid_config()).unwrap();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_server_name_fails() {
        let toml = minimal_valid_config().replace("\"Blizzard\"", "\"  \"");
        let config: Config = toml::from_str(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingServerName)));
    }

    #[test]
    fn test_zero_limits_fail() {
        let toml = format!(
            "{}\n[limits]\nmax_connections = 0\noutgoing_queue = 0\n",
            minimal_valid_config()
        );
        let config: Config = toml::from_str(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ZeroLimit("max_connections"))));
    }

    #[test]
    fn test_reserved_char_cannot_be_delimiter() {
        let toml = format!("{}\n[security]\nreserved_char = \"%\"\n", minimal_valid_config());
        let config: Config = toml::from_str(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::ReservedCharIsDelimiter('%')))
        );
    }

    #[test]
    fn test_bad_throttle_entries_fail() {
        let toml = format!(
            "{}\n[throttle]\n\"u#sf\" = 0\n\"\" = 3\n",
            minimal_valid_config()
        );
        let config: Config = toml::from_str(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ZeroCooldown(k) if k == "u#sf")));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::EmptyThrottleKey)));
    }

    #[test]
    fn test_missing_database_dir_fails() {
        let toml = format!(
            "{}\n[database]\npath = \"/nonexistent/dir/onyx.db\"\n",
            minimal_valid_config()
        );
        let config: Config = toml::from_str(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::DatabasePathInvalid(_))));
    }
}
