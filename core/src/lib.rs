//! Core functionality for the UDS client launcher
//!
//! This crate contains the tunnel process registry, the activation dispatch
//! task, and the process management primitives shared by the launcher
//! binary.

pub mod config;
pub mod error;
pub mod launcher;
#[cfg(unix)]
pub mod process;

#[cfg(test)]
mod error_tests;

// Re-export schema types for convenience
pub use schema::*;

pub use error::{CoreError, Result};
pub use launcher::{spawn_launcher, LauncherHandle, LauncherMsg, TunnelLauncherConfig};

/// Core utilities and helper functions
pub mod utils {
    use tracing::info;

    /// Initialize tracing for the application
    pub fn init_tracing(level: &str) -> crate::Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| crate::CoreError::InitializationError(e.to_string()))?;

        info!("Tracing initialized with level: {}", level);
        Ok(())
    }
}
