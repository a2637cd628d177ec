//! Helper client resolution
//!
//! The launcher itself never talks to remote hosts; it hands each activation
//! to the `udsclient` helper binary. By default that binary sits next to the
//! launcher executable. Inside a macOS application bundle the launcher is
//! registered under `Contents/Resources` while the executables live under
//! `Contents/MacOS`, so that path segment is swapped before joining.

use std::path::{Component, Path, PathBuf};

use schema::LauncherConfig;
use tracing::debug;

use crate::Result;

/// Name of the helper client binary spawned per activation
pub const HELPER_NAME: &str = "udsclient";

/// Resolve the helper path for the running executable
///
/// A non-empty `helperPath` in the configuration wins outright. Otherwise
/// the helper is looked for next to the current executable.
///
/// # Errors
/// Returns an error if the current executable path cannot be determined.
pub fn resolve_helper(config: &LauncherConfig) -> Result<PathBuf> {
    if let Some(path) = config.helper_path.as_deref() {
        if !path.trim().is_empty() {
            debug!("Using configured helper path: {}", path);
            return Ok(PathBuf::from(path));
        }
    }

    let exe = std::env::current_exe()?;
    Ok(helper_next_to(&exe))
}

/// Compute the default helper location for a given launcher executable path
pub fn helper_next_to(exe: &Path) -> PathBuf {
    let dir = exe.parent().unwrap_or_else(|| Path::new("."));

    // Bundle layout fix-up: Resources -> MacOS
    let mut resolved = PathBuf::new();
    for component in dir.components() {
        match component {
            Component::Normal(name) if name == "Resources" => resolved.push("MacOS"),
            other => resolved.push(other.as_os_str()),
        }
    }

    resolved.push(HELPER_NAME);
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_next_to_plain_directory() {
        let exe = Path::new("/usr/local/bin/uds-launcher");
        assert_eq!(
            helper_next_to(exe),
            PathBuf::from("/usr/local/bin/udsclient")
        );
    }

    #[test]
    fn test_helper_next_to_bundle_resources() {
        let exe = Path::new("/Applications/UDSClient.app/Contents/Resources/uds-launcher");
        assert_eq!(
            helper_next_to(exe),
            PathBuf::from("/Applications/UDSClient.app/Contents/MacOS/udsclient")
        );
    }

    #[test]
    fn test_helper_next_to_bare_name() {
        let exe = Path::new("uds-launcher");
        assert_eq!(helper_next_to(exe), PathBuf::from("./udsclient"));
    }

    #[test]
    fn test_configured_override_wins() {
        let config = LauncherConfig {
            helper_path: Some("/opt/uds/bin/custom-client".to_string()),
            ..Default::default()
        };
        let resolved = resolve_helper(&config).unwrap();
        assert_eq!(resolved, PathBuf::from("/opt/uds/bin/custom-client"));
    }

    #[test]
    fn test_empty_override_falls_back_to_sibling() {
        let config = LauncherConfig {
            helper_path: Some("   ".to_string()),
            ..Default::default()
        };
        let resolved = resolve_helper(&config).unwrap();
        assert!(resolved.ends_with(HELPER_NAME));
    }
}
