//! # Winery Supervisor
//!
//! Lifecycle management of a locally launched Winery service.
//!
//! This crate provides:
//! - Launcher configuration (YAML, with defaults and validation)
//! - Generation of the service's `winery.yml` before each launch
//! - The [`Supervisor`]: start, readiness, stop confirmation, exit handling
//!   and unexpected-exit notifications

pub mod config;
pub mod events;
mod launcher;
pub mod materialize;
mod state;
pub mod supervisor;

// Re-export main types
pub use config::{LauncherConfig, LauncherOptions, LauncherPaths, ServiceOptions};
pub use events::SupervisorEvent;
pub use materialize::{ConfigMaterializer, TemplateSource};
pub use state::SupervisorStatus;
pub use supervisor::Supervisor;
pub use winery_common::{ExitReport, Result, ServiceUrls, SupervisorError};
