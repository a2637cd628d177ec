//! UDS client launcher binary
//!
//! With no arguments this process is the launcher itself: it owns the
//! tunnel registry and serves the activation socket. With arguments it
//! execs the helper client, passing them through untouched.

#![allow(unused_crate_dependencies)]

use launcher::bootstrap::{bootstrap_with_config, load_config};
use launcher::helper::resolve_helper;
use launcher::{LauncherError, Result};
use launcher_core::utils;
use schema::LauncherConfig;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var("UDS_LAUNCHER_CONFIG").ok().map(PathBuf::from);
    let config = load_config(config_path)?;

    utils::init_tracing(&config.log_level)?;

    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    if !args.is_empty() {
        return exec_helper(&config, args);
    }

    info!("Starting UDS client launcher");

    let handle = bootstrap_with_config(config).await?;

    wait_for_shutdown_signal().await;
    info!("Received shutdown signal, closing remaining tunnels");
    handle.shutdown().await;

    info!("Launcher stopped");
    Ok(())
}

/// Hand the process over to the helper client
///
/// Returns only if the exec itself fails.
fn exec_helper(config: &LauncherConfig, args: Vec<OsString>) -> Result<()> {
    use std::os::unix::process::CommandExt;

    let helper = resolve_helper(config)?;
    info!("Direct invocation, handing over to {:?}", helper);

    let err = std::process::Command::new(&helper).args(args).exec();
    error!("Failed to exec helper {:?}: {}", helper, err);
    Err(LauncherError::BootstrapError(format!(
        "Failed to exec helper {:?}: {}",
        helper, err
    )))
}

/// Resolve when either SIGINT or SIGTERM arrives
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}
