//! # Winery Common
//!
//! Types shared by every crate of the Winery launcher.
//!
//! This crate provides the error taxonomy of the process supervisor and the
//! small value types (service URLs, exit reports) that travel between the
//! supervisor, its probes and its observers.

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{Result, SupervisorError};
pub use types::{ExitReport, ServiceUrls, SHUTDOWN_TOKEN};
