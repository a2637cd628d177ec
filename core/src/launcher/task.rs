//! Tunnel launcher task implementation
//!
//! This module contains the [`TunnelLauncher`] which owns the tunnel registry
//! and processes activation events one at a time.

use super::{LauncherMsg, TunnelRegistry, TunnelSpawner};
use crate::Result;
use schema::TunnelEvent;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info};

/// Launcher task owning the tunnel registry
///
/// The task is the only owner and mutator of the registry. Activation
/// handling is a plain synchronous method with no await points, so events
/// are always processed to completion in arrival order.
pub struct TunnelLauncher {
    /// Resolved path of the client helper binary
    helper: PathBuf,
    /// Spawner used to start tunnel processes
    spawner: Arc<dyn TunnelSpawner>,
    /// Registry of spawned tunnels
    registry: TunnelRegistry,
    /// Event broadcaster
    event_tx: broadcast::Sender<TunnelEvent>,
    /// Registry size broadcaster
    count_tx: watch::Sender<usize>,
}

impl TunnelLauncher {
    /// Create a new tunnel launcher
    pub fn new(
        helper: PathBuf,
        spawner: Arc<dyn TunnelSpawner>,
        event_tx: broadcast::Sender<TunnelEvent>,
        count_tx: watch::Sender<usize>,
    ) -> Self {
        Self {
            helper,
            spawner,
            registry: TunnelRegistry::new(),
            event_tx,
            count_tx,
        }
    }

    /// Handle one activation event carrying a resource identifier
    ///
    /// Reclaims finished registry entries, spawns the helper with the
    /// identifier as its sole argument, and registers the new handle. The
    /// identifier is passed through opaque and unmodified. On spawn failure
    /// the error is returned and the registry is left exactly as the reclaim
    /// pass left it; no entry is added and nothing is killed.
    pub fn handle_activation(&mut self, resource: &str) -> Result<()> {
        let reclaimed = self.registry.reclaim();
        for pid in reclaimed {
            let _ = self.event_tx.send(TunnelEvent::reclaimed(pid));
        }
        self.publish_count();

        let handle = match self.spawner.spawn(&self.helper, resource) {
            Ok(handle) => handle,
            Err(e) => {
                let _ = self
                    .event_tx
                    .send(TunnelEvent::spawn_failed(resource.to_string(), e.to_string()));
                return Err(e);
            }
        };

        let pid = handle.pid();
        self.registry.add(resource.to_string(), handle);
        let _ = self.event_tx.send(TunnelEvent::spawned(pid, resource.to_string()));
        self.publish_count();

        info!("Opened tunnel {} for {}", pid, resource);
        Ok(())
    }

    /// Number of registered tunnels
    pub fn tunnel_count(&self) -> usize {
        self.registry.len()
    }

    /// Snapshot the registered tunnels
    pub fn tunnels(&self) -> Vec<schema::TunnelInfo> {
        self.registry.tunnels()
    }

    /// Run the launcher message loop until shutdown
    ///
    /// The shutdown sweep runs exactly once, whether the loop ends through an
    /// explicit [`LauncherMsg::Shutdown`] or because every sender was dropped.
    pub async fn run(&mut self, mut control_rx: mpsc::UnboundedReceiver<LauncherMsg>) -> Result<()> {
        info!("Tunnel launcher started");

        while let Some(msg) = control_rx.recv().await {
            debug!("Received control message: {:?}", msg);
            match msg {
                LauncherMsg::Open(resource) => {
                    // The activation is consumed either way; a spawn failure
                    // must not take the launcher down
                    if let Err(e) = self.handle_activation(&resource) {
                        error!("Failed to open tunnel for {}: {}", resource, e);
                    }
                }
                LauncherMsg::ListTunnels { response } => {
                    let _ = response.send(self.registry.tunnels());
                }
                LauncherMsg::Shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        self.shutdown();
        info!("Tunnel launcher stopped");
        Ok(())
    }

    /// Force-kill every tunnel still running
    fn shutdown(&mut self) {
        let killed = self.registry.terminate_all();
        for pid in &killed {
            let _ = self.event_tx.send(TunnelEvent::killed(*pid));
        }
        if !killed.is_empty() {
            info!("Killed {} running tunnel(s) at shutdown", killed.len());
        }
    }

    fn publish_count(&self) {
        let _ = self.count_tx.send(self.registry.len());
    }
}
