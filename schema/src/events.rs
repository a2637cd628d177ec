//! Event system for the tunnel launcher
//!
//! This module defines the event types emitted by the launcher to provide
//! observability into tunnel process lifecycle: spawns, reclaimed exits,
//! and forced kills at shutdown.
//!
//! Events are designed to be serializable and can be:
//! - Logged to structured log files
//! - Used for debugging and operational visibility
//! - Broadcast to multiple subscribers via event channels

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Events emitted by the tunnel launcher
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "eventType", rename_all = "camelCase")]
pub enum TunnelEvent {
    /// A tunnel process has been spawned for an activation
    Spawned {
        /// Process ID of the spawned tunnel
        pid: u32,
        /// Resource identifier the tunnel was opened for
        resource: String,
        /// Event timestamp in RFC3339 format
        timestamp: String,
    },

    /// A finished tunnel entry was dropped from the registry
    Reclaimed {
        /// Process ID of the reclaimed tunnel
        pid: u32,
        /// Event timestamp in RFC3339 format
        timestamp: String,
    },

    /// A still-running tunnel was force-killed at shutdown
    Killed {
        /// Process ID of the killed tunnel
        pid: u32,
        /// Event timestamp in RFC3339 format
        timestamp: String,
    },

    /// Spawning a tunnel process failed
    SpawnFailed {
        /// Resource identifier the activation carried
        resource: String,
        /// Failure message
        message: String,
        /// Event timestamp in RFC3339 format
        timestamp: String,
    },
}

/// Event severity level for filtering and alerting
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "camelCase")]
pub enum EventSeverity {
    /// Debug information
    Debug,
    /// Informational events
    Info,
    /// Warning conditions
    Warning,
    /// Error conditions
    Error,
}

impl TunnelEvent {
    /// Get the timestamp for this event
    #[must_use]
    pub fn timestamp(&self) -> &str {
        match self {
            Self::Spawned { timestamp, .. }
            | Self::Reclaimed { timestamp, .. }
            | Self::Killed { timestamp, .. }
            | Self::SpawnFailed { timestamp, .. } => timestamp,
        }
    }

    /// Get the severity level for this event
    #[must_use]
    pub fn severity(&self) -> EventSeverity {
        match self {
            Self::Spawned { .. } | Self::Killed { .. } => EventSeverity::Info,
            Self::Reclaimed { .. } => EventSeverity::Debug,
            Self::SpawnFailed { .. } => EventSeverity::Error,
        }
    }

    /// Create a current timestamp string in RFC3339 format
    #[must_use]
    pub fn current_timestamp() -> String {
        // Simple RFC3339 format: YYYY-MM-DDTHH:MM:SSZ
        humantime::format_rfc3339_seconds(SystemTime::now()).to_string()
    }

    /// Create a spawned event
    #[must_use]
    pub fn spawned(pid: u32, resource: String) -> Self {
        Self::Spawned {
            pid,
            resource,
            timestamp: Self::current_timestamp(),
        }
    }

    /// Create a reclaimed event
    #[must_use]
    pub fn reclaimed(pid: u32) -> Self {
        Self::Reclaimed {
            pid,
            timestamp: Self::current_timestamp(),
        }
    }

    /// Create a killed event
    #[must_use]
    pub fn killed(pid: u32) -> Self {
        Self::Killed {
            pid,
            timestamp: Self::current_timestamp(),
        }
    }

    /// Create a spawn failed event
    #[must_use]
    pub fn spawn_failed(resource: String, message: String) -> Self {
        Self::SpawnFailed {
            resource,
            message,
            timestamp: Self::current_timestamp(),
        }
    }
}
