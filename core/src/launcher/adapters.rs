//! Tunnel adapters for abstracting process management
//!
//! This module provides traits and implementations for abstracting tunnel
//! process operations, enabling testing with mock implementations and
//! supporting different process management backends.
//!
//! All operations are synchronous and non-blocking: spawning returns as soon
//! as the process has started, liveness is a single poll, and kill sends a
//! signal without waiting for the exit.

use crate::Result;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Trait for starting tunnel processes
pub trait TunnelSpawner: Send + Sync {
    /// Spawn a tunnel process running `helper` with the resource identifier
    /// as its sole argument
    fn spawn(&self, helper: &Path, resource: &str) -> Result<Box<dyn TunnelHandle>>;
}

/// Trait representing a spawned tunnel process
///
/// A query failure while polling liveness is never surfaced: implementations
/// log it at debug level and report the tunnel as not running.
pub trait TunnelHandle: Send {
    /// Get the process ID
    fn pid(&self) -> u32;

    /// Check whether the process is still running, without blocking
    fn is_running(&mut self) -> bool;

    /// Kill the process forcefully (SIGKILL), without waiting for the exit
    fn kill(&mut self) -> Result<()>;
}

/// Unix tunnel spawner using the process group management in [`crate::process`]
#[cfg(unix)]
#[derive(Copy, Clone, Debug, Default)]
pub struct UnixTunnelSpawner;

#[cfg(unix)]
impl UnixTunnelSpawner {
    /// Create a new Unix tunnel spawner
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl TunnelSpawner for UnixTunnelSpawner {
    fn spawn(&self, helper: &Path, resource: &str) -> Result<Box<dyn TunnelHandle>> {
        use crate::process::unix;

        debug!("Spawning tunnel: {:?} {}", helper, resource);

        let cmd = helper.to_string_lossy();
        let child = unix::spawn(&cmd, &[resource])?;

        Ok(Box::new(UnixTunnel { child }))
    }
}

/// Unix tunnel handle implementation
#[cfg(unix)]
struct UnixTunnel {
    child: crate::process::unix::ChildProcess,
}

#[cfg(unix)]
impl TunnelHandle for UnixTunnel {
    fn pid(&self) -> u32 {
        self.child.pid()
    }

    fn is_running(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                debug!("Tunnel {} exited with status: {}", self.child.pid(), status);
                false
            }
            Err(e) => {
                // A handle we cannot poll is treated as no longer running
                debug!("Got error polling tunnel {}: {}", self.child.pid(), e);
                false
            }
        }
    }

    fn kill(&mut self) -> Result<()> {
        use crate::process::unix;
        unix::signal_kill_group(&self.child)
    }
}

/// Mock tunnel spawner for testing
#[derive(Debug, Clone, Default)]
pub struct MockTunnelSpawner {
    state: Arc<Mutex<MockSpawnerState>>,
}

/// Instructions for mock tunnel behavior
#[derive(Debug, Clone, Copy)]
pub struct MockInstruction {
    /// Whether the tunnel reports itself as running after spawn
    pub running: bool,
    /// Whether the spawn call itself should fail
    pub fail_spawn: bool,
    /// Whether liveness polls should act as query failures
    pub fail_liveness: bool,
    /// Whether kill requests should fail
    pub fail_kill: bool,
}

impl Default for MockInstruction {
    fn default() -> Self {
        Self {
            running: true,
            fail_spawn: false,
            fail_liveness: false,
            fail_kill: false,
        }
    }
}

#[derive(Debug, Default)]
struct MockSpawnerState {
    /// Scripted behavior for upcoming spawns, consumed front-first
    instructions: Vec<MockInstruction>,
    /// (pid, resource) pairs in spawn order
    spawned: Vec<(u32, String)>,
    /// Pids that received a successful kill, in order
    killed: Vec<u32>,
    /// Cells shared with the handles, for flipping liveness from tests
    cells: Vec<(u32, Arc<Mutex<MockTunnelCell>>)>,
    next_pid: u32,
}

#[derive(Debug)]
struct MockTunnelCell {
    running: bool,
    fail_liveness: bool,
    fail_kill: bool,
}

impl MockTunnelSpawner {
    /// Create a new mock spawner with default instructions
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the behavior of the next spawned tunnel
    pub fn add_instruction(&self, instruction: MockInstruction) {
        let mut state = self.state.lock().unwrap();
        state.instructions.push(instruction);
    }

    /// Get the (pid, resource) pairs spawned so far, in order
    pub fn spawned(&self) -> Vec<(u32, String)> {
        self.state.lock().unwrap().spawned.clone()
    }

    /// Get the pids successfully killed so far, in order
    pub fn killed(&self) -> Vec<u32> {
        self.state.lock().unwrap().killed.clone()
    }

    /// Flip a spawned tunnel to the exited state, as if the process had
    /// finished on its own
    pub fn mark_exited(&self, pid: u32) {
        let state = self.state.lock().unwrap();
        for (cell_pid, cell) in &state.cells {
            if *cell_pid == pid {
                cell.lock().unwrap().running = false;
                return;
            }
        }
        panic!("mark_exited: unknown pid {}", pid);
    }
}

impl TunnelSpawner for MockTunnelSpawner {
    fn spawn(&self, helper: &Path, resource: &str) -> Result<Box<dyn TunnelHandle>> {
        debug!("Spawning mock tunnel: {:?} {}", helper, resource);

        let mut state = self.state.lock().unwrap();
        let instruction = if state.instructions.is_empty() {
            MockInstruction::default()
        } else {
            state.instructions.remove(0)
        };

        if instruction.fail_spawn {
            return Err(crate::CoreError::ProcessSpawn(format!(
                "mock refused to spawn '{}'",
                resource
            )));
        }

        state.next_pid += 1;
        let pid = 1000 + state.next_pid;

        let cell = Arc::new(Mutex::new(MockTunnelCell {
            running: instruction.running,
            fail_liveness: instruction.fail_liveness,
            fail_kill: instruction.fail_kill,
        }));

        state.spawned.push((pid, resource.to_string()));
        state.cells.push((pid, cell.clone()));

        Ok(Box::new(MockTunnel {
            pid,
            cell,
            spawner: self.state.clone(),
        }))
    }
}

/// Mock tunnel handle for testing
struct MockTunnel {
    pid: u32,
    cell: Arc<Mutex<MockTunnelCell>>,
    spawner: Arc<Mutex<MockSpawnerState>>,
}

impl TunnelHandle for MockTunnel {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn is_running(&mut self) -> bool {
        let cell = self.cell.lock().unwrap();
        if cell.fail_liveness {
            debug!("Got error polling tunnel {}: mock liveness failure", self.pid);
            return false;
        }
        cell.running
    }

    fn kill(&mut self) -> Result<()> {
        let mut cell = self.cell.lock().unwrap();
        if cell.fail_kill {
            return Err(crate::CoreError::ProcessSignal(format!(
                "mock refused to kill {}",
                self.pid
            )));
        }
        debug!("Killing mock tunnel {}", self.pid);
        cell.running = false;
        self.spawner.lock().unwrap().killed.push(self.pid);
        Ok(())
    }
}
