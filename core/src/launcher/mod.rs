//! Tunnel launcher implementation
//!
//! This module provides the core launcher functionality: a registry of
//! spawned tunnel processes driven by activation events, with lazy
//! reclamation of finished tunnels and a force-kill sweep at shutdown.
//!
//! ## Architecture
//!
//! The launcher uses a single task model: one tokio task owns the registry
//! and processes control messages in arrival order. Each activation runs
//! reclaim, spawn, and add to completion before the next message is taken:
//!
//! ```text
//! activation -> Reclaim -> spawn helper -> Add
//! shutdown   -> TerminateAll
//! ```
//!
//! ## Components
//!
//! - [`LauncherHandle`]: Control interface for launcher operations
//! - [`LauncherMsg`]: Messages for controlling the launcher
//! - [`TunnelSpawner`]: Trait for abstracting tunnel process management
//! - [`TunnelLauncher`]: Task owning the registry and handling activations

use crate::Result;
use schema::{TunnelEvent, TunnelInfo};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{error, info};

pub mod adapters;
pub mod registry;
pub mod task;


pub use adapters::*;
pub use registry::*;
pub use task::*;

/// Control messages for launcher operations
#[derive(Debug)]
pub enum LauncherMsg {
    /// Open a tunnel for the given resource identifier
    Open(String),
    /// Get a snapshot of the registered tunnels
    ListTunnels {
        /// Response channel for the snapshot
        response: oneshot::Sender<Vec<TunnelInfo>>,
    },
    /// Shutdown the launcher (force-kill running tunnels and terminate task)
    Shutdown,
}

/// Handle for controlling a launcher instance
#[derive(Debug, Clone)]
pub struct LauncherHandle {
    /// Channel for sending control messages
    control_tx: mpsc::UnboundedSender<LauncherMsg>,
    /// Receiver for registry size updates
    count_rx: watch::Receiver<usize>,
}

impl LauncherHandle {
    /// Send a control message to the launcher
    pub fn send(&self, msg: LauncherMsg) -> Result<()> {
        self.control_tx
            .send(msg)
            .map_err(|_| crate::CoreError::LauncherError("Launcher task has shut down".to_string()))?;
        Ok(())
    }

    /// Open a tunnel for the given resource identifier
    pub fn open(&self, resource: impl Into<String>) -> Result<()> {
        self.send(LauncherMsg::Open(resource.into()))
    }

    /// Shutdown the launcher
    pub fn shutdown(&self) -> Result<()> {
        self.send(LauncherMsg::Shutdown)
    }

    /// Get the current number of registered tunnels
    pub fn tunnel_count(&self) -> usize {
        *self.count_rx.borrow()
    }

    /// Subscribe to registry size changes
    pub fn subscribe_to_count(&self) -> watch::Receiver<usize> {
        self.count_rx.clone()
    }

    /// Get a snapshot of the registered tunnels
    pub async fn list_tunnels(&self) -> Result<Vec<TunnelInfo>> {
        let (response_tx, response_rx) = oneshot::channel();

        self.send(LauncherMsg::ListTunnels {
            response: response_tx,
        })?;

        response_rx
            .await
            .map_err(|_| crate::CoreError::LauncherError("Failed to get tunnel list response".to_string()))
    }
}

/// Configuration for spawning a launcher
pub struct TunnelLauncherConfig {
    /// Resolved path of the client helper binary
    pub helper: PathBuf,
    /// Spawner for starting tunnel processes
    pub spawner: Arc<dyn TunnelSpawner>,
    /// Event broadcaster for emitting tunnel events
    pub event_tx: broadcast::Sender<TunnelEvent>,
}

/// Spawn a launcher task
///
/// This creates a new tokio task that owns the tunnel registry and processes
/// activation events. The launcher emits events to the provided broadcast
/// channel and uses the spawner for actual process management.
///
/// # Arguments
///
/// * `config` - Configuration for the launcher
///
/// # Returns
///
/// A [`LauncherHandle`] that can be used to control the launcher.
pub fn spawn_launcher(config: TunnelLauncherConfig) -> LauncherHandle {
    let TunnelLauncherConfig {
        helper,
        spawner,
        event_tx,
    } = config;

    let (control_tx, control_rx) = mpsc::unbounded_channel();
    let (count_tx, count_rx) = watch::channel(0);

    info!("Spawning tunnel launcher with helper {:?}", helper);

    tokio::spawn(async move {
        let mut launcher = TunnelLauncher::new(helper, spawner, event_tx, count_tx);

        if let Err(e) = launcher.run(control_rx).await {
            error!("Tunnel launcher task failed: {}", e);
        }

        info!("Tunnel launcher task terminated");
    });

    LauncherHandle {
        control_tx,
        count_rx,
    }
}
