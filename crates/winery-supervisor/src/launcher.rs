//! Spawning the service and watching it until it exits.

use std::time::Duration;
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use winery_common::{ExitReport, Result};
use winery_log_collection::{LineCallback, ServiceLog, StreamType};
use winery_process::LaunchSpec;

/// Upper bound on waiting for buffered output once the process is gone.
/// Grandchildren that inherited the pipes would otherwise keep them open.
pub(crate) const STREAM_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// A spawned process with its output readers attached.
pub(crate) struct LaunchedProcess {
    pub child: Child,
    pub pid: Option<u32>,
    pub streams: Vec<JoinHandle<()>>,
}

/// Spawn `spec` and attach line readers to both output streams.
///
/// Standard output goes to the service log only; every standard error line
/// is also handed to `on_stderr_line`.
pub(crate) fn launch(
    spec: &LaunchSpec,
    log: &ServiceLog,
    on_stderr_line: LineCallback,
) -> Result<LaunchedProcess> {
    let mut child = spec.spawn()?;
    let pid = child.id();

    let mut streams = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        streams.push(log.collect_from_stream(stdout, StreamType::Stdout, None));
    }
    if let Some(stderr) = child.stderr.take() {
        streams.push(log.collect_from_stream(stderr, StreamType::Stderr, Some(on_stderr_line)));
    }

    Ok(LaunchedProcess { child, pid, streams })
}

/// Wait until the process exits or a kill is requested through `kill`.
///
/// `on_exited` runs as soon as the OS reports the exit; its result is
/// returned together with the report once the output readers have drained.
pub(crate) async fn wait_for_exit<F, T>(
    launched: LaunchedProcess,
    mut kill: oneshot::Receiver<()>,
    on_exited: F,
) -> (T, ExitReport)
where
    F: FnOnce(&ExitReport) -> T,
{
    let LaunchedProcess {
        mut child,
        pid,
        streams,
    } = launched;

    let waited = tokio::select! {
        status = child.wait() => Some(status),
        Ok(()) = &mut kill => None,
    };

    let status = match waited {
        Some(status) => status,
        None => {
            warn!("Killing Winery (PID: {:?})", pid);
            if let Err(e) = child.start_kill() {
                error!("Failed to kill Winery (PID: {:?}): {}", pid, e);
            }
            child.wait().await
        }
    };

    let report = match status {
        Ok(status) => ExitReport::from_status(status),
        Err(e) => {
            error!("Failed to wait for Winery (PID: {:?}): {}", pid, e);
            ExitReport::from_error(e)
        }
    };
    let exited = on_exited(&report);

    for handle in streams {
        match tokio::time::timeout(STREAM_DRAIN_TIMEOUT, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Output reader failed: {}", e),
            Err(_) => debug!("Output still open {:?} after exit, not waiting further", STREAM_DRAIN_TIMEOUT),
        }
    }

    (exited, report)
}
