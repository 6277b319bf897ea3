//! Stop-confirmation poll loop.
//!
//! After a shutdown request the service is probed until it stops accepting
//! connections. Only a failed connection confirms the stop: a 2xx answer
//! means the service is still up, a non-2xx answer means it is still
//! shutting down, and a timeout means it may just be busy. All three are
//! retried after the poll interval, without an attempt limit.

use crate::{HttpProber, ProbeOutcome, ProbeResult};
use std::time::Duration;
use tracing::{debug, info};

/// Result of a confirmed stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopConfirmation {
    /// Attempt on which the endpoint was found unreachable.
    pub attempts: u32,
}

/// Polls one URL until it becomes unreachable.
#[derive(Debug, Clone)]
pub struct StopProbe {
    prober: HttpProber,
    url: String,
    interval: Duration,
}

impl StopProbe {
    pub fn new(prober: HttpProber, url: impl Into<String>, interval: Duration) -> Self {
        Self {
            prober,
            url: url.into(),
            interval,
        }
    }

    pub async fn run(&self) -> ProbeResult<StopConfirmation> {
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match self.prober.get(&self.url).await? {
                ProbeOutcome::Unreachable { reason } => {
                    debug!(url = %self.url, %reason, "Endpoint unreachable");
                    return Ok(StopConfirmation { attempts });
                }
                outcome => {
                    info!("Waiting for the Winery to stop...");
                    debug!(url = %self.url, ?outcome, "Still answering");
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }
}
