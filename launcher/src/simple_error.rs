//! Simple launcher error types

#[derive(Debug)]
pub enum LauncherError {
    BootstrapError(String),
    ListenerError(String),
    FrameError(String),
    IoError(std::io::Error),
    CoreError(launcher_core::CoreError),
}

impl std::fmt::Display for LauncherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LauncherError::BootstrapError(msg) => write!(f, "Bootstrap error: {}", msg),
            LauncherError::ListenerError(msg) => write!(f, "Listener error: {}", msg),
            LauncherError::FrameError(msg) => write!(f, "Frame error: {}", msg),
            LauncherError::IoError(err) => write!(f, "I/O error: {}", err),
            LauncherError::CoreError(err) => write!(f, "Core error: {}", err),
        }
    }
}

impl std::error::Error for LauncherError {}

impl From<std::io::Error> for LauncherError {
    fn from(err: std::io::Error) -> Self {
        LauncherError::IoError(err)
    }
}

impl From<launcher_core::CoreError> for LauncherError {
    fn from(err: launcher_core::CoreError) -> Self {
        LauncherError::CoreError(err)
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;
