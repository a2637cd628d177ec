//! Configuration loading and validation for the launcher
//!
//! This module parses a TOML configuration into `schema::LauncherConfig`,
//! applies sane defaults (via serde defaults on schema types), and performs
//! strict validation with field-path error messages.

use crate::{CoreError, Result};
use schema::LauncherConfig;
use std::fs;
use std::path::Path;

/// Validate a launcher configuration with field-path errors
pub fn validate_launcher_config(config: &LauncherConfig) -> Result<()> {
    if let Some(path) = &config.helper_path {
        if path.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "helperPath: cannot be empty".to_string(),
            ));
        }
    }
    if let Some(path) = &config.socket_path {
        if path.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "socketPath: cannot be empty".to_string(),
            ));
        }
    }
    if config.log_level.trim().is_empty() {
        return Err(CoreError::ValidationError(
            "logLevel: cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Load a launcher configuration from a TOML file path
pub fn load_launcher_config_from_toml_path(path: impl AsRef<Path>) -> Result<LauncherConfig> {
    let data = fs::read_to_string(&path).map_err(|e| {
        CoreError::ConfigurationError(format!("Failed to read config {:?}: {}", path.as_ref(), e))
    })?;
    load_launcher_config_from_toml_str(&data)
}

/// Load a launcher configuration from a TOML string
pub fn load_launcher_config_from_toml_str(input: &str) -> Result<LauncherConfig> {
    let config: LauncherConfig = toml::from_str(input)
        .map_err(|e| CoreError::ConfigurationError(format!("TOML parse error: {}", e)))?;
    validate_launcher_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let input = r#"
        helperPath = "/opt/uds/udsclient"
        socketPath = "/run/uds-launcher.sock"
        logLevel = "debug"
        "#;
        let config = load_launcher_config_from_toml_str(input).expect("should parse");
        assert_eq!(config.helper_path.as_deref(), Some("/opt/uds/udsclient"));
        assert_eq!(config.socket_path.as_deref(), Some("/run/uds-launcher.sock"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn applies_defaults_for_missing_fields() {
        let config = load_launcher_config_from_toml_str("").expect("should parse");
        assert_eq!(config.helper_path, None);
        assert_eq!(config.socket_path, None);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn errors_on_empty_helper_path() {
        let err = load_launcher_config_from_toml_str("helperPath = \"  \"").unwrap_err();
        assert!(format!("{}", err).contains("helperPath: cannot be empty"));
    }

    #[test]
    fn errors_on_empty_log_level() {
        let err = load_launcher_config_from_toml_str("logLevel = \"\"").unwrap_err();
        assert!(format!("{}", err).contains("logLevel: cannot be empty"));
    }

    #[test]
    fn errors_on_invalid_toml() {
        let err = load_launcher_config_from_toml_str("helperPath = [").unwrap_err();
        assert!(format!("{}", err).contains("TOML parse error"));
    }

    #[test]
    fn errors_on_missing_file() {
        let err =
            load_launcher_config_from_toml_path("/nonexistent/uds-launcher.toml").unwrap_err();
        assert!(matches!(err, CoreError::ConfigurationError(_)));
    }

    #[test]
    fn loads_from_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launcher.toml");
        fs::write(&path, "logLevel = \"warn\"\n").unwrap();

        let config = load_launcher_config_from_toml_path(&path).expect("should parse");
        assert_eq!(config.log_level, "warn");
    }
}
