#[cfg(test)]
mod tests {
    use crate::{LauncherError, Result};
    use std::error::Error;
    use std::io;

    #[test]
    fn test_launcher_error_display() {
        let err = LauncherError::BootstrapError("helper not found".to_string());
        assert_eq!(err.to_string(), "Bootstrap error: helper not found");

        let err = LauncherError::ListenerError("bad socket path".to_string());
        assert_eq!(err.to_string(), "Listener error: bad socket path");

        let err = LauncherError::FrameError("activation line too long".to_string());
        assert_eq!(err.to_string(), "Frame error: activation line too long");

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = LauncherError::IoError(io_err);
        assert!(err.to_string().contains("access denied"));

        let core_err = launcher_core::CoreError::ProcessSpawn("no such helper".to_string());
        let err = LauncherError::CoreError(core_err);
        assert!(err.to_string().contains("no such helper"));
    }

    #[test]
    fn test_launcher_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let launcher_err: LauncherError = io_err.into();

        if let LauncherError::IoError(_) = launcher_err {
            // Expected variant
        } else {
            panic!("Expected LauncherError::IoError variant");
        }
    }

    #[test]
    fn test_launcher_error_from_core() {
        let core_err = launcher_core::CoreError::LauncherError("task gone".to_string());
        let launcher_err: LauncherError = core_err.into();

        if let LauncherError::CoreError(_) = launcher_err {
            // Expected variant
        } else {
            panic!("Expected LauncherError::CoreError variant");
        }
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<u32> {
            Ok(42)
        }

        fn returns_err() -> Result<u32> {
            Err(LauncherError::ListenerError("test failure".to_string()))
        }

        assert_eq!(returns_ok().unwrap(), 42);
        assert!(returns_err().is_err());
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = LauncherError::ListenerError("test".to_string());

        // Test that it implements std::error::Error
        let _: &dyn Error = &err;

        // Test source method
        assert!(err.source().is_none());
    }
}
