//! Free port discovery.
//!
//! A port counts as free when it can be bound on the IPv4 loopback and
//! wildcard addresses, and is not taken on the IPv6 loopback. The probe
//! listeners are dropped immediately, so the port is only known to be free
//! at the moment of the check.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, Ipv6Addr, TcpListener};
use tracing::debug;
use winery_common::{Result, SupervisorError};

/// Port the launcher starts searching from.
pub const DEFAULT_BASELINE_PORT: u16 = 8000;

/// Find the first free TCP port at or above `baseline`.
///
/// # Errors
///
/// Returns [`SupervisorError::PortUnavailable`] when every port from the
/// baseline up to 65535 is taken.
pub fn find_free_port(baseline: u16) -> Result<u16> {
    let first = baseline.max(1);
    let port = (first..=u16::MAX)
        .find(|&port| is_port_free(port))
        .ok_or_else(|| SupervisorError::port_unavailable(baseline))?;

    debug!(baseline, port, "Found free port");
    Ok(port)
}

/// Check whether nothing is listening on `port` locally.
pub fn is_port_free(port: u16) -> bool {
    if port == 0 {
        return false;
    }

    let v4_free = [Ipv4Addr::LOCALHOST, Ipv4Addr::UNSPECIFIED]
        .iter()
        .all(|ip| TcpListener::bind((*ip, port)).is_ok());
    if !v4_free {
        return false;
    }

    // Hosts without IPv6 fail with something other than AddrInUse.
    match TcpListener::bind((Ipv6Addr::LOCALHOST, port)) {
        Ok(_) => true,
        Err(e) => e.kind() != ErrorKind::AddrInUse,
    }
}
