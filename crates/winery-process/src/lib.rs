//! # Winery Process
//!
//! Low-level process primitives for the Winery launcher.
//!
//! This crate provides:
//! - Free port discovery starting from a baseline port
//! - The service command line (JVM arguments, environment, piped streams)
//! - Spawning with standard output and error captured

pub mod execute;
pub mod port;

// Re-export main types
pub use execute::*;
pub use port::*;
