//! Registry of spawned tunnel processes
//!
//! The registry is an insertion-ordered collection of tunnel handles with two
//! sweep operations: a lazy reclaim pass that drops entries whose process has
//! finished, and a shutdown pass that force-kills everything still running.
//! Neither pass ever blocks on a process.

use super::TunnelHandle;
use schema::{TunnelEvent, TunnelInfo};
use tracing::{debug, info, warn};

/// A registered tunnel: the process handle plus bookkeeping for observability
struct TunnelEntry {
    /// Resource identifier the tunnel was opened for
    resource: String,
    /// Spawn timestamp in RFC3339 format
    started_at: String,
    /// Handle to the tunnel process
    handle: Box<dyn TunnelHandle>,
}

/// Ordered collection of tunnel process handles
///
/// The registry is exclusively owned by the launcher task; there is no
/// locking and no sharing. Entries are kept in spawn order.
#[derive(Default)]
pub struct TunnelRegistry {
    entries: Vec<TunnelEntry>,
}

impl TunnelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly spawned tunnel
    pub fn add(&mut self, resource: String, handle: Box<dyn TunnelHandle>) {
        debug!("Registering tunnel {} for {}", handle.pid(), resource);
        self.entries.push(TunnelEntry {
            resource,
            started_at: TunnelEvent::current_timestamp(),
            handle,
        });
    }

    /// Drop entries whose process has finished, returning the reclaimed pids
    ///
    /// Retains every entry that still reports itself running. A liveness
    /// query failure counts as not running, so an unpollable handle is
    /// reclaimed rather than kept forever. Running tunnels are never touched
    /// and the pass never aborts partway.
    pub fn reclaim(&mut self) -> Vec<u32> {
        let mut reclaimed = Vec::new();
        self.entries.retain_mut(|entry| {
            if entry.handle.is_running() {
                true
            } else {
                debug!(
                    "Reclaiming finished tunnel {} for {}",
                    entry.handle.pid(),
                    entry.resource
                );
                reclaimed.push(entry.handle.pid());
                false
            }
        });
        reclaimed
    }

    /// Force-kill every tunnel still running, returning the killed pids
    ///
    /// Entries are not removed; the registry is discarded wholesale when the
    /// launcher exits. A failed kill is logged and the sweep moves on to the
    /// next entry. Nothing waits for the processes to actually die.
    pub fn terminate_all(&mut self) -> Vec<u32> {
        let mut killed = Vec::new();
        for entry in &mut self.entries {
            if !entry.handle.is_running() {
                continue;
            }
            let pid = entry.handle.pid();
            info!("Found running tunnel {}, killing it", pid);
            match entry.handle.kill() {
                Ok(()) => killed.push(pid),
                Err(e) => warn!("Failed to kill tunnel {}: {}", pid, e),
            }
        }
        killed
    }

    /// Snapshot the registered tunnels in spawn order
    pub fn tunnels(&self) -> Vec<TunnelInfo> {
        self.entries
            .iter()
            .map(|entry| TunnelInfo {
                pid: entry.handle.pid(),
                resource: entry.resource.clone(),
                started_at: entry.started_at.clone(),
            })
            .collect()
    }

    /// Number of registered tunnels (running or not yet reclaimed)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no tunnels
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
