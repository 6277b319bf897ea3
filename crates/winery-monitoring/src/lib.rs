//! # Winery Monitoring
//!
//! HTTP probing for the Winery launcher.
//!
//! This crate provides:
//! - A single-shot HTTP prober that classifies each attempt as OK, non-OK,
//!   unreachable or timed out
//! - The readiness poll loop (wait until the service answers OK)
//! - The stop-confirmation poll loop (wait until the service no longer
//!   accepts connections)
//!
//! Both loops retry on a fixed interval without an attempt limit; callers
//! that want a ceiling wrap them in `tokio::time::timeout`.

pub mod http;
pub mod readiness;
pub mod shutdown;


use std::time::Duration;
use thiserror::Error;

/// Delay between two probe attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Per-request timeout of a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that prevent a probe from being attempted at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Invalid probe URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build probe request: {url} - {reason}")]
    RequestBuild { url: String, reason: String },
}

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Classification of one HTTP attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The service answered with a 2xx status.
    Ok { status: u16 },
    /// The service answered, but not with a 2xx status.
    NotOk { status: u16 },
    /// The connection failed: refused, reset or closed before an answer.
    Unreachable { reason: String },
    /// No answer within the per-request timeout; the service may still be up.
    TimedOut { after: Duration },
}

impl ProbeOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ProbeOutcome::Ok { .. })
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, ProbeOutcome::Unreachable { .. })
    }
}

// Re-export main types
pub use http::HttpProber;
pub use readiness::{ReadinessOutcome, ReadinessProbe};
pub use shutdown::{StopConfirmation, StopProbe};
