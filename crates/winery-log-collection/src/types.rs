//! Core types for log collection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity a captured line is recorded with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Stream type (stdout or stderr)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Stdout,
    Stderr,
}

impl StreamType {
    /// Level every line of this stream is recorded at.
    pub fn level(&self) -> LogLevel {
        match self {
            StreamType::Stdout => LogLevel::Info,
            StreamType::Stderr => LogLevel::Error,
        }
    }
}

impl std::fmt::Display for StreamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamType::Stdout => write!(f, "stdout"),
            StreamType::Stderr => write!(f, "stderr"),
        }
    }
}

/// One captured line, ready for output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub stream: StreamType,
    pub message: String,
}

impl LogEntry {
    pub fn new(stream: StreamType, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level: stream.level(),
            stream,
            message: message.into(),
        }
    }

    /// Format: `[timestamp] [level] message`
    pub fn to_line(&self) -> String {
        format!(
            "[{}] [{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.level,
            self.message
        )
    }
}
