//! Unix process management with safe spawn/kill using process groups
//!
//! This module provides Unix-specific process management capabilities that use
//! process groups (via `setsid()`) to ensure safe and reliable process cleanup.
//!
//! ## Safety
//!
//! - All spawned processes are placed in their own process group using `setsid()`
//! - Signals are sent to the entire process group to ensure cleanup of child processes
//! - Proper error handling for race conditions and edge cases
//!
//! ## Process Groups
//!
//! When a process calls `setsid()`, it:
//! - Creates a new session and becomes the session leader
//! - Creates a new process group and becomes the process group leader
//! - Has no controlling terminal
//!
//! This allows us to signal the entire process tree by sending signals to the
//! process group.
//!
//! Tunnel processes are launched fire-and-forget: their stdout/stderr are
//! inherited rather than piped, liveness is observed with a non-blocking
//! `try_wait()`, and termination is an immediate SIGKILL with no waiting for
//! the exit to complete.

// Allow unsafe code for this module since process management requires libc::setsid() calls
#![allow(unsafe_code)]

use crate::{CoreError, Result};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
#[allow(unused_imports)]
use std::os::unix::process::CommandExt;
use tokio::process::{Child, Command};
use tracing::{debug, error};

/// A child process managed with Unix process groups
///
/// This wrapper provides safe process group management for spawned processes.
/// The process is guaranteed to be in its own process group, allowing for
/// reliable cleanup of the entire process tree.
#[derive(Debug)]
pub struct ChildProcess {
    /// The process ID of the spawned process
    pid: Pid,
    /// The underlying Child handle for status checking
    child: Child,
}

impl ChildProcess {
    /// Get the process ID
    pub fn pid(&self) -> u32 {
        self.pid.as_raw() as u32
    }

    /// Get the process group ID (same as PID for session leaders)
    pub fn pgid(&self) -> u32 {
        self.pid.as_raw() as u32
    }

    /// Try to wait for the process to exit without blocking
    ///
    /// Returns `Ok(Some(status))` once the process has exited (reaping it in
    /// the same call), `Ok(None)` while it is still running.
    pub fn try_wait(&mut self) -> Result<Option<std::process::ExitStatus>> {
        self.child.try_wait().map_err(|e| {
            CoreError::ProcessWait(format!(
                "Failed to try_wait for process {}: {}",
                self.pid, e
            ))
        })
    }
}

/// Spawn a new process in its own process group
///
/// This function spawns a new process using the specified command and arguments.
/// The process is placed in its own process group via `setsid()`, which:
///
/// - Creates a new session with the process as session leader
/// - Creates a new process group with the process as group leader
/// - Detaches from the controlling terminal
///
/// The child's stdout and stderr are inherited from the launcher. Tunnel
/// output is the client's own business; nothing is captured or redirected.
///
/// ## Arguments
///
/// * `cmd` - The command to execute (must be in PATH or an absolute path)
/// * `args` - Command line arguments for the process
///
/// ## Safety
///
/// This function uses `unsafe` code to call `libc::setsid()` in the `pre_exec`
/// closure. The safety is ensured because:
/// - `setsid()` is called in the child process before `exec()`
/// - `setsid()` is async-signal-safe and appropriate for use in `pre_exec`
/// - Error handling properly converts C errors to Rust errors
///
/// ## Example
///
/// ```rust,no_run
/// use launcher_core::process::unix::spawn;
///
/// let child = spawn("/opt/uds/udsclient", &["uds://host1/x"])?;
/// println!("Spawned tunnel with PID: {}", child.pid());
/// # Ok::<(), launcher_core::CoreError>(())
/// ```
pub fn spawn(cmd: &str, args: &[&str]) -> Result<ChildProcess> {
    debug!("Spawning process: {} {:?}", cmd, args);

    let mut command = Command::new(cmd);
    command.args(args);

    // Use pre_exec to call setsid() in the child process
    // Safety: setsid() is async-signal-safe and appropriate for use in pre_exec
    #[deny(unsafe_op_in_unsafe_fn)]
    unsafe {
        command.pre_exec(|| {
            // Create a new session and process group
            let result = libc::setsid();
            if result == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let child = command.spawn().map_err(|e| {
        error!("Failed to spawn process '{}': {}", cmd, e);
        CoreError::ProcessSpawn(format!("Failed to spawn '{}': {}", cmd, e))
    })?;

    // tokio::process::Child::id() may return Option on some platforms
    let raw_pid = child
        .id()
        .ok_or_else(|| CoreError::ProcessSpawn("Spawned child did not have a PID".to_string()))?;
    let pid = Pid::from_raw(raw_pid as i32);
    debug!("Successfully spawned process {} in new process group", pid);

    Ok(ChildProcess { pid, child })
}

/// Send SIGKILL to the process group for forceful termination
///
/// This function sends SIGKILL to the entire process group containing the
/// target process. This forcefully terminates the process and any child
/// processes immediately, without allowing for cleanup. The call returns as
/// soon as the signal has been sent; it never waits for the exit.
///
/// ## Arguments
///
/// * `child` - The child process whose process group should be killed
///
/// ## Error Handling
///
/// - `ESRCH` (No such process) is treated as success since it means the process
///   group has already exited
/// - Other errors are propagated as `ProcessSignal` errors
///
/// ## Example
///
/// ```rust,no_run
/// use launcher_core::process::unix::{spawn, signal_kill_group};
///
/// let child = spawn("sleep", &["30"])?;
/// signal_kill_group(&child)?; // Forcefully terminate
/// # Ok::<(), launcher_core::CoreError>(())
/// ```
pub fn signal_kill_group(child: &ChildProcess) -> Result<()> {
    debug!("Sending SIGKILL to process group {}", child.pid);

    match killpg(child.pid, Signal::SIGKILL) {
        Ok(()) => {
            debug!("Successfully sent SIGKILL to process group {}", child.pid);
            Ok(())
        }
        Err(nix::errno::Errno::ESRCH) => {
            // Process group doesn't exist, which means it already exited
            debug!("Process group {} already exited", child.pid);
            Ok(())
        }
        Err(nix::errno::Errno::EPERM) => {
            // Permission denied - process may have already exited or changed ownership
            debug!(
                "Permission denied signaling process group {} (likely already exited)",
                child.pid
            );
            Ok(())
        }
        Err(e) => {
            error!(
                "Failed to send SIGKILL to process group {}: {}",
                child.pid, e
            );
            Err(CoreError::ProcessSignal(format!(
                "Failed to send SIGKILL to process group {}: {}",
                child.pid, e
            )))
        }
    }
}
