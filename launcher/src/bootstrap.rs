//! Launcher bootstrap: wire configuration, helper resolution, the launcher
//! task, and the activation intake socket
//!
//! This module provides a `bootstrap` function that loads the launcher
//! configuration, resolves the helper client, starts the tunnel launcher
//! task together with an event logger, and binds the activation socket.

use launcher_core::config::load_launcher_config_from_toml_path;
use launcher_core::launcher::UnixTunnelSpawner;
use launcher_core::{spawn_launcher, LauncherHandle, TunnelLauncherConfig};
use schema::{EventSeverity, LauncherConfig, TunnelEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::helper::resolve_helper;
use crate::{ActivationListener, LauncherError, Result};

/// Default activation socket path
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/uds-launcher.sock";

/// Handle to manage the running components
#[derive(Debug)]
pub struct BootstrapHandle {
    #[allow(missing_docs)]
    pub launcher: LauncherHandle,
    #[allow(missing_docs)]
    pub socket_path: PathBuf,
    intake_task: Option<JoinHandle<()>>,
    event_task: Option<JoinHandle<()>>,
}

impl BootstrapHandle {
    /// Initiate shutdown: stop the intake socket, kill remaining tunnels
    pub async fn shutdown(mut self) {
        if let Some(task) = self.intake_task.take() {
            // The accept loop has no exit path of its own
            task.abort();
        }

        let _ = self.launcher.shutdown();

        if let Some(task) = self.event_task.take() {
            // The logger drains until the launcher task drops its event
            // sender, so joining it means the kill pass has finished
            let _ = task.await;
        }

        // Best-effort removal of the socket file
        let _ = std::fs::remove_file(&self.socket_path);
        info!("Launcher shutdown complete");
    }
}

/// Load the launcher configuration, falling back to defaults when no
/// path is given
///
/// # Errors
/// Returns an error if the file cannot be read or fails validation.
pub fn load_config(config_path: Option<PathBuf>) -> Result<LauncherConfig> {
    match config_path {
        Some(path) => load_launcher_config_from_toml_path(&path)
            .map_err(|e| LauncherError::BootstrapError(e.to_string())),
        None => Ok(LauncherConfig::default()),
    }
}

/// Bootstrap the launcher components
///
/// # Errors
/// Returns an error if the configuration cannot be loaded or the helper
/// client cannot be resolved.
pub async fn bootstrap(config_path: Option<PathBuf>) -> Result<BootstrapHandle> {
    let config = load_config(config_path)?;
    bootstrap_with_config(config).await
}

/// Bootstrap from an already-loaded configuration
///
/// # Errors
/// Returns an error if the helper client cannot be resolved.
pub async fn bootstrap_with_config(config: LauncherConfig) -> Result<BootstrapHandle> {
    let helper = resolve_helper(&config)?;
    info!("Tunnel helper: {:?}", helper);

    let socket_path = activation_socket_path(&config);

    let (event_tx, event_rx) = broadcast::channel(1024);
    let event_task = Some(spawn_event_logger(event_rx));

    let launcher = spawn_launcher(TunnelLauncherConfig {
        helper,
        spawner: Arc::new(UnixTunnelSpawner::new()),
        event_tx,
    });

    let listener = ActivationListener::new(socket_path.clone(), launcher.clone());
    let intake_task = Some(tokio::spawn(async move {
        if let Err(e) = listener.serve().await {
            error!("Activation listener terminated: {}", e);
        }
    }));

    Ok(BootstrapHandle {
        launcher,
        socket_path,
        intake_task,
        event_task,
    })
}

/// Activation socket path precedence: environment override, then
/// configuration, then the default
pub fn activation_socket_path(config: &LauncherConfig) -> PathBuf {
    if let Ok(path) = std::env::var("UDS_LAUNCHER_SOCKET") {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    if let Some(path) = config.socket_path.as_deref() {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    PathBuf::from(DEFAULT_SOCKET_PATH)
}

/// Log every tunnel event as a JSON line at its mapped severity
fn spawn_event_logger(mut rx: broadcast::Receiver<TunnelEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => log_event(&event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("Event logger lagged, missed {} events", missed);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn log_event(event: &TunnelEvent) {
    let line = serde_json::to_string(event).unwrap_or_else(|_| format!("{:?}", event));
    match event.severity() {
        EventSeverity::Debug => debug!("{}", line),
        EventSeverity::Info => info!("{}", line),
        EventSeverity::Warning => warn!("{}", line),
        EventSeverity::Error => error!("{}", line),
    }
}
