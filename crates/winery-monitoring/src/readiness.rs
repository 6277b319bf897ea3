//! Readiness poll loop.
//!
//! Probes the service until it answers with a 2xx status. Any other
//! outcome (non-2xx status, connection refused while the service is still
//! binding its port, timeout) schedules another attempt after the poll
//! interval. There is no attempt limit: the loop ends on success, or when
//! the caller's liveness check reports that waiting is pointless because
//! the process is gone.

use crate::{HttpProber, ProbeResult};
use std::time::Duration;
use tracing::{debug, info};

/// How a readiness wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessOutcome {
    /// The endpoint answered OK on attempt number `attempts`.
    Ready { attempts: u32 },
    /// The liveness check failed before attempt number `attempts + 1`.
    Abandoned { attempts: u32 },
}

/// Polls one URL until it answers OK.
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    prober: HttpProber,
    url: String,
    interval: Duration,
}

impl ReadinessProbe {
    pub fn new(prober: HttpProber, url: impl Into<String>, interval: Duration) -> Self {
        Self {
            prober,
            url: url.into(),
            interval,
        }
    }

    /// Poll until ready. `still_waiting` is consulted before every attempt;
    /// returning `false` stops the loop silently.
    pub async fn run<F>(&self, mut still_waiting: F) -> ProbeResult<ReadinessOutcome>
    where
        F: FnMut() -> bool,
    {
        let mut attempts = 0u32;

        loop {
            if !still_waiting() {
                debug!(url = %self.url, attempts, "Readiness wait abandoned");
                return Ok(ReadinessOutcome::Abandoned { attempts });
            }

            attempts += 1;
            let outcome = self.prober.get(&self.url).await?;
            if outcome.is_ok() {
                return Ok(ReadinessOutcome::Ready { attempts });
            }

            info!("Waiting for the Winery to start ({})...", self.url);
            debug!(url = %self.url, ?outcome, "Not ready yet");
            tokio::time::sleep(self.interval).await;
        }
    }
}
