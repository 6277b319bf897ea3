//! Value types shared between the supervisor, its probes and observers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Control token expected by the service's shutdown endpoint.
pub const SHUTDOWN_TOKEN: &str = "winery";

/// Endpoints of a Winery instance listening on a given port.
///
/// # Example
/// ```
/// use winery_common::ServiceUrls;
///
/// let urls = ServiceUrls::for_port(8001);
/// assert_eq!(urls.ui, "http://localhost:8001");
/// assert_eq!(urls.api, "http://localhost:8001/winery");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceUrls {
    /// Base URL, also used as the repository UI URL.
    pub ui: String,
    /// Repository REST API.
    pub api: String,
    /// Topology modeler front-end.
    pub topology_modeler: String,
}

impl ServiceUrls {
    pub fn for_port(port: u16) -> Self {
        let ui = format!("http://localhost:{}", port);
        Self {
            api: format!("{}/winery", ui),
            topology_modeler: format!("{}/winery-topologymodeler", ui),
            ui,
        }
    }

    /// URL polled for readiness and stop confirmation.
    pub fn probe_url(&self) -> &str {
        &self.api
    }

    /// URL of the graceful shutdown call.
    pub fn shutdown_url(&self) -> String {
        format!("{}/shutdown?token={}", self.ui, SHUTDOWN_TOKEN)
    }
}

/// How a service process ended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitReport {
    pub code: Option<i32>,
    pub signal: Option<i32>,
    /// Set when the process could not be waited on at the OS level.
    pub error: Option<String>,
}

impl ExitReport {
    pub fn from_status(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
            error: None,
        }
    }

    pub fn from_error(error: impl ToString) -> Self {
        Self {
            code: None,
            signal: None,
            error: Some(error.to_string()),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for ExitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref error) = self.error {
            return write!(f, "error: {}", error);
        }
        match (self.signal, self.code) {
            (Some(signal), _) => write!(f, "signal {}", signal),
            (None, Some(code)) => write!(f, "code {}", code),
            (None, None) => write!(f, "unknown status"),
        }
    }
}
