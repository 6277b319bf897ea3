//! # Winery Log Collection
//!
//! Capture of the supervised service's output.
//!
//! This crate provides:
//! - Line readers for the service's standard output and error
//! - The "service log": every captured line is forwarded verbatim, stdout
//!   at info level and stderr at error level
//! - Output targets (append-only file, bounded in-memory buffer)
//!
//! Supervisor diagnostics do not go through this crate; they use `tracing`.

pub mod output;
pub mod service;
pub mod types;

use thiserror::Error;

/// Log output errors.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("Failed to open log file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write log output: {0}")]
    Write(#[from] std::io::Error),
}

/// Result type for log output operations.
pub type LogResult<T> = Result<T, LogError>;

// Re-export main types
pub use output::{FileOutputWriter, MemoryOutputWriter, OutputWriter};
pub use service::{LineCallback, ServiceLog, ServiceLogStatus};
pub use types::{LogEntry, LogLevel, StreamType};
