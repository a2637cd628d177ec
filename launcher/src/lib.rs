//! Launcher library for the UDS client launcher
//!
//! Turns activation lines arriving on a Unix domain socket into tunnel
//! open requests. The platform URL handler writes one resource identifier
//! per line; each accepted line is forwarded to the launcher task and
//! acknowledged with `ok`, whatever later happens to the spawn.

#![allow(unused_crate_dependencies)]

pub mod bootstrap;
pub mod helper;
pub mod simple_error;

#[cfg(test)]
mod simple_error_tests;

use launcher_core::LauncherHandle;
pub use simple_error::{LauncherError, Result};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

/// Maximum allowed size for a single activation line (64KB)
const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Unix-socket listener feeding activations to the launcher task
#[derive(Debug)]
pub struct ActivationListener {
    socket_path: PathBuf,
    launcher: LauncherHandle,
}

impl ActivationListener {
    /// Create a listener; `serve` performs the actual bind
    #[must_use]
    pub fn new(socket_path: PathBuf, launcher: LauncherHandle) -> Self {
        Self {
            socket_path,
            launcher,
        }
    }

    /// Bind the activation socket and serve connections until aborted
    ///
    /// # Errors
    /// Returns an error if a pre-existing socket file cannot be removed or
    /// the socket cannot be bound.
    pub async fn serve(&self) -> Result<()> {
        // Remove pre-existing socket file if present
        if self.socket_path.exists() {
            match std::fs::remove_file(&self.socket_path) {
                Ok(_) => debug!("Removed existing socket at {:?}", self.socket_path),
                Err(e) => {
                    return Err(LauncherError::ListenerError(format!(
                        "Failed to remove existing socket {:?}: {}",
                        self.socket_path, e
                    )));
                }
            }
        }

        let listener = UnixListener::bind(&self.socket_path).map_err(|e| {
            LauncherError::ListenerError(format!(
                "Failed to bind activation socket {:?}: {}",
                self.socket_path, e
            ))
        })?;
        info!("Activation listener on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let launcher = self.launcher.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, launcher).await {
                            error!("Error handling activation connection: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept activation connection: {}", e);
                }
            }
        }
    }
}

/// Handle one activation connection
///
/// Lines are newline-delimited resource identifiers. Empty lines are
/// skipped. Oversized lines terminate the connection; invalid UTF-8 is
/// rejected per line. The identifier itself is passed through untouched.
async fn handle_connection(stream: UnixStream, launcher: LauncherHandle) -> Result<()> {
    let (reader_half, mut writer_half) = stream.into_split();
    let mut reader = BufReader::new(reader_half);
    let mut frame = Vec::with_capacity(1024);

    loop {
        frame.clear();
        let n = reader.read_until(b'\n', &mut frame).await?;
        if n == 0 {
            break;
        }

        if frame.len() > MAX_FRAME_SIZE {
            writer_half.write_all(b"err frame too large\n").await?;
            return Err(LauncherError::FrameError(format!(
                "Activation line size {} exceeds maximum allowed size of {} bytes",
                frame.len(),
                MAX_FRAME_SIZE
            )));
        }

        if matches!(frame.last(), Some(b'\n')) {
            frame.pop();
            if matches!(frame.last(), Some(b'\r')) {
                frame.pop();
            }
        }
        if frame.is_empty() {
            continue;
        }

        let resource = match std::str::from_utf8(&frame) {
            Ok(s) => s,
            Err(_) => {
                warn!("Rejecting activation line with invalid UTF-8");
                writer_half.write_all(b"err invalid utf-8\n").await?;
                continue;
            }
        };

        debug!("Got url: {}", resource);
        if let Err(e) = launcher.open(resource) {
            writer_half.write_all(b"err launcher unavailable\n").await?;
            return Err(e.into());
        }

        // The activation is consumed whether or not the spawn later succeeds
        writer_half.write_all(b"ok\n").await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use launcher_core::launcher::MockTunnelSpawner;
    use launcher_core::{spawn_launcher, TunnelLauncherConfig};
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};

    fn start_launcher(spawner: &MockTunnelSpawner) -> LauncherHandle {
        let (event_tx, _event_rx) = tokio::sync::broadcast::channel(64);
        spawn_launcher(TunnelLauncherConfig {
            helper: "/opt/uds/udsclient".into(),
            spawner: Arc::new(spawner.clone()),
            event_tx,
        })
    }

    fn start_listener(sock: &Path, handle: LauncherHandle) {
        let listener = ActivationListener::new(sock.to_path_buf(), handle);
        tokio::spawn(async move {
            let _ = listener.serve().await;
        });
    }

    async fn connect_with_retry(path: &Path) -> (BufReader<OwnedReadHalf>, OwnedWriteHalf) {
        for _ in 0..50 {
            if let Ok(stream) = UnixStream::connect(path).await {
                let (read_half, write_half) = stream.into_split();
                return (BufReader::new(read_half), write_half);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Could not connect to activation socket {:?}", path);
    }

    async fn read_ack(reader: &mut BufReader<OwnedReadHalf>) -> String {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await.unwrap();
        assert!(n > 0, "Connection closed before ack line");
        line.trim_end().to_string()
    }

    async fn wait_for_spawns(spawner: &MockTunnelSpawner, count: usize) {
        for _ in 0..100 {
            if spawner.spawned().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Expected {} spawns, saw {:?}", count, spawner.spawned());
    }

    #[tokio::test]
    async fn test_activation_line_spawns_tunnel() {
        let dir = tempfile::tempdir().unwrap();
        let sock = dir.path().join("launcher.sock");

        let spawner = MockTunnelSpawner::new();
        start_listener(&sock, start_launcher(&spawner));

        let (mut reader, mut writer) = connect_with_retry(&sock).await;
        writer.write_all(b"uds://host1/x\n").await.unwrap();
        assert_eq!(read_ack(&mut reader).await, "ok");

        wait_for_spawns(&spawner, 1).await;
        assert_eq!(spawner.spawned()[0].1, "uds://host1/x");
    }

    #[tokio::test]
    async fn test_empty_and_crlf_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let sock = dir.path().join("launcher.sock");

        let spawner = MockTunnelSpawner::new();
        start_listener(&sock, start_launcher(&spawner));

        let (mut reader, mut writer) = connect_with_retry(&sock).await;
        writer.write_all(b"\n\r\nuds://host2/y\r\n").await.unwrap();

        // Only the non-empty line is acknowledged
        assert_eq!(read_ack(&mut reader).await, "ok");

        wait_for_spawns(&spawner, 1).await;
        assert_eq!(spawner.spawned(), vec![(1001, "uds://host2/y".to_string())]);
    }

    #[tokio::test]
    async fn test_oversized_line_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sock = dir.path().join("launcher.sock");

        let spawner = MockTunnelSpawner::new();
        start_listener(&sock, start_launcher(&spawner));

        let (mut reader, mut writer) = connect_with_retry(&sock).await;
        let mut line = vec![b'a'; MAX_FRAME_SIZE + 1];
        line.push(b'\n');
        writer.write_all(&line).await.unwrap();

        assert_eq!(read_ack(&mut reader).await, "err frame too large");
        assert!(spawner.spawned().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_rejected_but_connection_survives() {
        let dir = tempfile::tempdir().unwrap();
        let sock = dir.path().join("launcher.sock");

        let spawner = MockTunnelSpawner::new();
        start_listener(&sock, start_launcher(&spawner));

        let (mut reader, mut writer) = connect_with_retry(&sock).await;
        writer.write_all(b"\xff\xfe\n").await.unwrap();
        assert_eq!(read_ack(&mut reader).await, "err invalid utf-8");

        writer.write_all(b"uds://host1/x\n").await.unwrap();
        assert_eq!(read_ack(&mut reader).await, "ok");

        wait_for_spawns(&spawner, 1).await;
    }

    #[tokio::test]
    async fn test_stale_socket_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let sock = dir.path().join("launcher.sock");
        std::fs::write(&sock, b"stale").unwrap();

        let spawner = MockTunnelSpawner::new();
        start_listener(&sock, start_launcher(&spawner));

        let (mut reader, mut writer) = connect_with_retry(&sock).await;
        writer.write_all(b"uds://host1/x\n").await.unwrap();
        assert_eq!(read_ack(&mut reader).await, "ok");
    }

    #[tokio::test]
    async fn test_launcher_gone_closes_connection_with_err() {
        let dir = tempfile::tempdir().unwrap();
        let sock = dir.path().join("launcher.sock");

        let spawner = MockTunnelSpawner::new();
        let handle = start_launcher(&spawner);
        handle.shutdown().unwrap();
        // Give the task a moment to drain and exit
        tokio::time::sleep(Duration::from_millis(50)).await;

        start_listener(&sock, handle);

        let (mut reader, mut writer) = connect_with_retry(&sock).await;
        writer.write_all(b"uds://host1/x\n").await.unwrap();
        assert_eq!(read_ack(&mut reader).await, "err launcher unavailable");
    }
}
