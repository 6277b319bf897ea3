//! The Winery process supervisor.

use crate::config::{LauncherConfig, LauncherPaths};
use crate::events::{SupervisorEvent, EVENT_CHANNEL_CAPACITY};
use crate::launcher::{self, LaunchedProcess, STREAM_DRAIN_TIMEOUT};
use crate::materialize::{ConfigMaterializer, TemplateSource};
use crate::state::{ExitDisposition, ProcessRecord, SupervisorState, SupervisorStatus};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot, watch};
use tracing::{debug, error, info, warn};
use winery_common::{ExitReport, Result, ServiceUrls, SupervisorError};
use winery_log_collection::{FileOutputWriter, LineCallback, LogResult, ServiceLog};
use winery_monitoring::{HttpProber, ProbeOutcome, ReadinessOutcome, ReadinessProbe, StopProbe};
use winery_process::{find_free_port, LaunchSpec};

/// Supervises one Winery service process at a time.
///
/// Cloning is cheap; clones share the same process and state.
#[derive(Clone)]
pub struct Supervisor {
    core: Arc<SupervisorCore>,
}

struct SupervisorCore {
    config: LauncherConfig,
    paths: LauncherPaths,
    materializer: ConfigMaterializer,
    prober: HttpProber,
    service_log: ServiceLog,
    state: Mutex<SupervisorState>,
    events: broadcast::Sender<SupervisorEvent>,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("data_dir", &self.core.paths.data_dir)
            .field("status", &self.status())
            .finish()
    }
}

impl Supervisor {
    /// Create a supervisor whose service output goes to `winery.log` in the
    /// data directory.
    pub fn new(config: LauncherConfig) -> LogResult<Self> {
        let service_log = ServiceLog::new().with_output(FileOutputWriter::new(config.paths().service_log)?);
        Ok(Self::with_service_log(config, service_log))
    }

    /// Create a supervisor that records service output to `service_log`.
    pub fn with_service_log(config: LauncherConfig, service_log: ServiceLog) -> Self {
        let paths = config.paths();
        let template = match &config.service.config_template {
            Some(path) => TemplateSource::File(path.clone()),
            None => TemplateSource::Builtin,
        };
        let materializer = ConfigMaterializer::new(template, &paths.winery_config_file);
        let prober = HttpProber::new(config.launcher.probe_timeout);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            core: Arc::new(SupervisorCore {
                config,
                paths,
                materializer,
                prober,
                service_log,
                state: Mutex::new(SupervisorState::default()),
                events,
            }),
        }
    }

    /// Launch the service for `repository_path` and wait until it answers.
    ///
    /// Resolves once the service is ready. Fails with `StartAborted` when
    /// the process exits first.
    pub async fn start(&self, repository_path: impl AsRef<Path>) -> Result<()> {
        let repository_path = repository_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&repository_path)
            .map_err(|e| SupervisorError::repository_unavailable(&repository_path, e))?;

        let Some(generation) = self.core.state.lock().begin_launch() else {
            error!("Winery already running!");
            return Err(SupervisorError::AlreadyRunning);
        };

        let PortedProcess { port, process: launched } = match self.launch(generation, &repository_path) {
            Ok(launched) => launched,
            Err(e) => {
                error!("Starting the Winery failed: {}", e);
                self.core.state.lock().abandon_launch(generation);
                return Err(e);
            }
        };

        let (kill_tx, kill_rx) = oneshot::channel();
        let (exit_tx, exit_rx) = watch::channel(None);

        self.core.state.lock().register(
            ProcessRecord {
                generation,
                pid: launched.pid,
                port,
                stopping: false,
                kill: Some(kill_tx),
            },
            repository_path,
        );

        self.spawn_exit_watcher(generation, launched, kill_rx, exit_tx);
        self.wait_until_ready(generation, port, exit_rx).await
    }

    /// Ask the service to shut down and wait until it no longer answers.
    ///
    /// Never fails; when nothing is running this only logs.
    pub async fn stop(&self) {
        let target = self.core.state.lock().request_stop();

        let Some((generation, port)) = target else {
            error!("Winery not running!");
            return;
        };

        info!("Stopping the Winery...");
        let urls = ServiceUrls::for_port(port);
        match self.core.prober.post(&urls.shutdown_url()).await {
            Ok(ProbeOutcome::Unreachable { reason }) => {
                warn!("Shutdown request failed: {}", reason)
            }
            Ok(ProbeOutcome::TimedOut { after }) => {
                warn!("Shutdown request not answered within {:?}", after)
            }
            Ok(outcome) => debug!(?outcome, "Shutdown requested"),
            Err(e) => warn!("Shutdown request failed: {}", e),
        }

        let probe = StopProbe::new(
            self.core.prober.clone(),
            urls.probe_url(),
            self.core.config.launcher.poll_interval,
        );

        let confirmation = match self.core.config.launcher.stop_timeout {
            Some(limit) => match tokio::time::timeout(limit, probe.run()).await {
                Ok(confirmation) => confirmation,
                Err(_) => {
                    warn!("Winery still answering after {:?}, killing it", limit);
                    self.kill(generation);
                    return;
                }
            },
            None => probe.run().await,
        };

        match confirmation {
            Ok(confirmation) => {
                debug!(attempts = confirmation.attempts, "Stop confirmed");
                info!("Winery stopped!");
            }
            Err(e) => warn!("Could not confirm the Winery stopped: {}", e),
        }
    }

    /// True from spawn until the OS reports the exit.
    pub fn running(&self) -> bool {
        self.core.state.lock().is_running()
    }

    pub fn ready(&self) -> bool {
        self.core.state.lock().ready
    }

    /// Port of the ready service.
    pub fn port(&self) -> Option<u16> {
        self.core.state.lock().port
    }

    /// Repository of the most recent launch.
    pub fn repository_path(&self) -> Option<PathBuf> {
        self.core.state.lock().repository_path.clone()
    }

    /// Most recent standard error line of the most recent launch.
    pub fn last_error_line(&self) -> Option<String> {
        self.core.state.lock().last_error_line.clone()
    }

    /// Base URL of the running service.
    pub fn backend_url(&self) -> Result<String> {
        let state = self.core.state.lock();
        match state.process.as_ref() {
            Some(record) => Ok(ServiceUrls::for_port(record.port).ui),
            None => Err(SupervisorError::NotRunning),
        }
    }

    pub fn status(&self) -> SupervisorStatus {
        self.core.state.lock().status()
    }

    /// Receive notifications about unexpected exits.
    pub fn subscribe(&self) -> broadcast::Receiver<SupervisorEvent> {
        self.core.events.subscribe()
    }

    pub fn paths(&self) -> &LauncherPaths {
        &self.core.paths
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.core.config
    }

    /// Allocate a port, write the configuration and spawn the process for
    /// the reserved launch.
    fn launch(&self, generation: u64, repository_path: &Path) -> Result<PortedProcess> {
        let port = find_free_port(self.core.config.launcher.baseline_port)?;
        info!("Starting the Winery on port {}...", port);

        self.core.materializer.materialize(port, repository_path)?;

        let spec = self.launch_spec(port);
        let process = launcher::launch(&spec, &self.core.service_log, self.stderr_callback(generation))?;
        Ok(PortedProcess { port, process })
    }

    fn launch_spec(&self, port: u16) -> LaunchSpec {
        let service = &self.core.config.service;
        LaunchSpec::winery(
            &service.java_path,
            &self.core.paths.data_dir,
            port,
            &service.logback_config,
            &service.launcher_jar,
        )
        .with_environment(service.environment.clone())
    }

    fn stderr_callback(&self, generation: u64) -> LineCallback {
        let core = Arc::clone(&self.core);
        Arc::new(move |line: &str| {
            core.state.lock().record_error_line(generation, line);
        })
    }

    fn spawn_exit_watcher(
        &self,
        generation: u64,
        launched: LaunchedProcess,
        kill_rx: oneshot::Receiver<()>,
        exit_tx: watch::Sender<Option<ExitReport>>,
    ) {
        let core = Arc::clone(&self.core);
        tokio::spawn(async move {
            let marker = Arc::clone(&core);
            let (disposition, report) = launcher::wait_for_exit(launched, kill_rx, move |_: &ExitReport| {
                marker.state.lock().handle_exit(generation)
            })
            .await;

            core.report_exit(generation, disposition, &report);
            exit_tx.send_replace(Some(report));
        });
    }

    async fn wait_until_ready(
        &self,
        generation: u64,
        port: u16,
        mut exit_rx: watch::Receiver<Option<ExitReport>>,
    ) -> Result<()> {
        let urls = ServiceUrls::for_port(port);
        let probe = ReadinessProbe::new(
            self.core.prober.clone(),
            urls.probe_url(),
            self.core.config.launcher.poll_interval,
        );

        let core = Arc::clone(&self.core);
        let readiness = async {
            let polling = probe.run(|| core.state.lock().is_alive(generation));
            let exited = exit_reported(&mut exit_rx);

            tokio::select! {
                biased;
                _ = exited => None,
                outcome = polling => Some(outcome),
            }
        };

        let outcome = match self.core.config.launcher.ready_timeout {
            Some(limit) => match tokio::time::timeout(limit, readiness).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    error!("Winery did not become ready within {:?}", limit);
                    self.core.state.lock().should_be_running = false;
                    self.kill(generation);
                    return Err(SupervisorError::start_timed_out(port, limit));
                }
            },
            None => readiness.await,
        };

        match outcome {
            Some(Ok(ReadinessOutcome::Ready { attempts })) => {
                if self.core.state.lock().mark_ready(generation, port) {
                    debug!(attempts, "Readiness confirmed");
                    info!("Winery started on port {}", port);
                    return Ok(());
                }
            }
            Some(Ok(ReadinessOutcome::Abandoned { .. })) | None => {}
            Some(Err(e)) => {
                error!("Cannot probe the Winery: {}", e);
                self.kill(generation);
            }
        }

        Err(self.start_aborted(&mut exit_rx).await)
    }

    /// Build the abort error once the exit procedure has run, so the final
    /// stderr line is part of it.
    async fn start_aborted(&self, exit_rx: &mut watch::Receiver<Option<ExitReport>>) -> SupervisorError {
        if tokio::time::timeout(2 * STREAM_DRAIN_TIMEOUT, exit_reported(exit_rx))
            .await
            .is_err()
        {
            debug!("Exit report not published yet");
        }
        let err = SupervisorError::start_aborted(self.last_error_line());
        error!("{}", err);
        err
    }

    fn kill(&self, generation: u64) {
        let kill = self.core.state.lock().take_kill(generation);
        if let Some(kill) = kill {
            let _ = kill.send(());
        }
    }
}

/// A spawned process and the port it was told to use.
struct PortedProcess {
    port: u16,
    process: LaunchedProcess,
}

/// Resolves once the exit report is published, or the watcher is gone.
async fn exit_reported(exit_rx: &mut watch::Receiver<Option<ExitReport>>) {
    while exit_rx.borrow_and_update().is_none() {
        if exit_rx.changed().await.is_err() {
            break;
        }
    }
}

impl SupervisorCore {
    /// Publish an exit once the output of the launch has drained, so the
    /// event carries the final stderr line.
    fn report_exit(&self, generation: u64, disposition: ExitDisposition, report: &ExitReport) {
        self.service_log.flush();

        match disposition {
            ExitDisposition::Stale => {
                debug!(generation, "Ignoring exit of a previous launch");
            }
            ExitDisposition::Expected => {
                info!("Winery exited with {}", report);
            }
            ExitDisposition::Unexpected => {
                let error = self.state.lock().exit_error(generation);
                error!("Winery exited unexpectedly with {}: {}", report, error);
                let event = SupervisorEvent::UnexpectedExit {
                    error,
                    exit: report.clone(),
                };
                if self.events.send(event).is_err() {
                    debug!("No subscribers for the unexpected exit");
                }
            }
        }
    }
}
