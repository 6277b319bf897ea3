//! Error types for the Winery launcher.
//!
//! Every failure the supervisor can report is a variant of
//! [`SupervisorError`]. Errors raised before the service process exists
//! (port allocation, configuration writing, spawning) reject `start`
//! directly. Errors raised after the process exists are only observable
//! through the exit path: either as [`SupervisorError::StartAborted`] while
//! a start is pending, or as the payload of an unexpected-exit event.
//!
//! ```rust
//! use winery_common::{Result, SupervisorError};
//!
//! fn allocate() -> Result<u16> {
//!     Err(SupervisorError::port_unavailable(8000))
//! }
//!
//! assert!(matches!(allocate(), Err(SupervisorError::PortUnavailable { baseline: 8000 })));
//! ```

use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for supervisor operations.
pub type Result<T> = std::result::Result<T, SupervisorError>;

/// Supervisor error taxonomy.
///
/// The enum is `Clone` because an error built from the last captured
/// stderr line is published to every subscriber of the supervisor events.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SupervisorError {
    /// `start` was called while a service process is still alive.
    #[error("Winery already running")]
    AlreadyRunning,

    /// No free TCP port at or above the baseline.
    #[error("No free port available at or above {baseline}")]
    PortUnavailable { baseline: u16 },

    /// The repository directory could not be created.
    #[error("Repository path unavailable: {path} - {reason}")]
    RepositoryUnavailable { path: String, reason: String },

    /// Reading the template or writing the materialized configuration failed.
    #[error("Failed to write configuration {path}: {reason}")]
    ConfigWrite { path: String, reason: String },

    /// The operating system refused to launch the service process.
    #[error("Failed to spawn {command}: {reason}")]
    SpawnFailed { command: String, reason: String },

    /// The service exited before the readiness probe succeeded.
    #[error("Winery exited while waiting for it to start{}", line_suffix(.last_error_line))]
    StartAborted { last_error_line: Option<String> },

    /// The optional readiness ceiling elapsed before the service answered.
    #[error("Winery did not become ready on port {port} within {waited:?}")]
    StartTimedOut { port: u16, waited: Duration },

    /// The service terminated without a stop request.
    #[error("Winery exited unexpectedly{}", line_suffix(.last_error_line))]
    UnexpectedExit { last_error_line: Option<String> },

    /// An operation that needs a running service was called while stopped.
    #[error("Winery not running")]
    NotRunning,
}

fn line_suffix(line: &Option<String>) -> String {
    match line {
        Some(line) => format!(": {}", line),
        None => String::new(),
    }
}

impl SupervisorError {
    pub fn port_unavailable(baseline: u16) -> Self {
        Self::PortUnavailable { baseline }
    }

    pub fn repository_unavailable(path: &Path, reason: impl ToString) -> Self {
        Self::RepositoryUnavailable {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn config_write(path: &Path, reason: impl ToString) -> Self {
        Self::ConfigWrite {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn spawn_failed(command: impl Into<String>, reason: impl ToString) -> Self {
        Self::SpawnFailed {
            command: command.into(),
            reason: reason.to_string(),
        }
    }

    pub fn start_aborted(last_error_line: Option<String>) -> Self {
        Self::StartAborted { last_error_line }
    }

    pub fn start_timed_out(port: u16, waited: Duration) -> Self {
        Self::StartTimedOut { port, waited }
    }

    pub fn unexpected_exit(last_error_line: Option<String>) -> Self {
        Self::UnexpectedExit { last_error_line }
    }

    /// The stderr line carried by exit-related errors, if any.
    pub fn last_error_line(&self) -> Option<&str> {
        match self {
            Self::StartAborted { last_error_line } | Self::UnexpectedExit { last_error_line } => {
                last_error_line.as_deref()
            }
            _ => None,
        }
    }
}
