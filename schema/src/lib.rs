//! Schema definitions for the UDS client launcher
//!
//! This crate contains shared data structures and schemas used across
//! the launcher ecosystem. All types here implement JSON Schema
//! generation for external consumption.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod events;

pub use events::{EventSeverity, TunnelEvent};

/// Configuration structure for the launcher
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LauncherConfig {
    /// Path to the client helper binary; resolved relative to the launcher
    /// executable when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_path: Option<String>,
    /// Path of the Unix socket that receives activation events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<String>,
    /// Log level for the launcher
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            helper_path: None,
            socket_path: None,
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Snapshot of a registered tunnel process
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TunnelInfo {
    /// Process ID of the tunnel
    pub pid: u32,
    /// Resource identifier the tunnel was opened for
    pub resource: String,
    /// Spawn timestamp in RFC3339 format
    pub started_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::schema_for;

    #[test]
    fn test_launcher_config_defaults() {
        let config = LauncherConfig::default();
        assert_eq!(config.helper_path, None);
        assert_eq!(config.socket_path, None);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_launcher_config_serialization() {
        let config = LauncherConfig {
            helper_path: Some("/opt/uds/udsclient".to_string()),
            socket_path: None,
            log_level: "debug".to_string(),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("helperPath"));
        assert!(json.contains("logLevel"));
        assert!(!json.contains("socketPath"));
    }

    #[test]
    fn test_launcher_config_deserialization_applies_defaults() {
        let config: LauncherConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.log_level, "info");
        assert!(config.helper_path.is_none());
    }

    #[test]
    fn test_tunnel_info_serialization() {
        let info = TunnelInfo {
            pid: 4242,
            resource: "uds://host1/x".to_string(),
            started_at: "2024-01-01T00:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"pid\":4242"));
        assert!(json.contains("startedAt"));
        assert!(json.contains("uds://host1/x"));
    }

    #[test]
    fn test_schema_generation() {
        // Just check that schemas can be generated without panicking
        let _config_schema = schema_for!(LauncherConfig);
        let _info_schema = schema_for!(TunnelInfo);
        let _event_schema = schema_for!(TunnelEvent);
    }
}
