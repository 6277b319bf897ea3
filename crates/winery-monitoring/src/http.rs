// HTTP probe implementation

use crate::{ProbeError, ProbeOutcome, ProbeResult, DEFAULT_PROBE_TIMEOUT};
use http_body_util::Empty;
use hyper::body::Bytes;
use hyper::header::USER_AGENT;
use hyper::{Method, Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::debug;

/// Issues single HTTP requests and classifies the result.
///
/// Idle connections are not pooled: every probe opens a fresh connection,
/// so a closed listening socket is observed immediately as unreachable.
#[derive(Clone)]
pub struct HttpProber {
    client: Client<HttpConnector, Empty<Bytes>>,
    timeout: Duration,
}

impl std::fmt::Debug for HttpProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProber")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build_http();

        Self { client, timeout }
    }

    /// Probe `url` with a GET request.
    pub async fn get(&self, url: &str) -> ProbeResult<ProbeOutcome> {
        self.request(Method::GET, url).await
    }

    /// Send an empty POST to `url`.
    pub async fn post(&self, url: &str) -> ProbeResult<ProbeOutcome> {
        self.request(Method::POST, url).await
    }

    async fn request(&self, method: Method, url: &str) -> ProbeResult<ProbeOutcome> {
        let start_time = Instant::now();

        let uri: Uri = url.parse().map_err(|e| ProbeError::InvalidUrl {
            url: url.to_string(),
            reason: format!("{}", e),
        })?;

        let request = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(USER_AGENT, "Winery-Launcher/1.0")
            .body(Empty::<Bytes>::new())
            .map_err(|e| ProbeError::RequestBuild {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let outcome = match timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if status.is_success() {
                    ProbeOutcome::Ok { status: status.as_u16() }
                } else {
                    ProbeOutcome::NotOk { status: status.as_u16() }
                }
            }
            Ok(Err(e)) => ProbeOutcome::Unreachable {
                reason: format!("Connection failed: {}", e),
            },
            Err(_) => ProbeOutcome::TimedOut {
                after: self.timeout,
            },
        };

        debug!(
            "{} {} -> {:?} ({}ms)",
            method,
            url,
            outcome,
            start_time.elapsed().as_millis()
        );
        Ok(outcome)
    }
}
