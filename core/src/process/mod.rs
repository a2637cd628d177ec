//! Process management utilities for the launcher core library
//!
//! This module provides the process spawning and signaling primitives the
//! tunnel registry is built on, with platform-specific implementations for
//! safe process spawning, liveness polling, and forced cleanup.
//!
//! ## Platform Support
//!
//! - **Unix**: Full support with process groups for safe cleanup
//!
//! ## Safety
//!
//! The implementations prioritize safe process management by:
//! - Using process groups (Unix) for reliable cleanup of whole process trees
//! - Never blocking on a child: liveness checks use `try_wait()` and
//!   termination is a fire-and-forget SIGKILL

#[cfg(unix)]
pub mod unix;

#[cfg(unix)]
pub use unix::*;
