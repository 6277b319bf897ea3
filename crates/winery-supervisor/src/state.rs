//! Supervisor state and the transitions applied under its lock.

use std::path::PathBuf;
use tokio::sync::oneshot;
use winery_common::SupervisorError;

/// Bookkeeping for the currently launched process.
#[derive(Debug)]
pub(crate) struct ProcessRecord {
    /// Distinguishes this launch from earlier ones
    pub generation: u64,
    pub pid: Option<u32>,
    /// Port allocated for this launch; published only once ready
    pub port: u16,
    /// A stop was requested for this launch
    pub stopping: bool,
    /// Asks the exit watcher to kill the process
    pub kill: Option<oneshot::Sender<()>>,
}

/// What the exit of a launch means for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExitDisposition {
    /// The exit belongs to an older launch
    Stale,
    /// Stop requested, or the process never became ready
    Expected,
    /// A ready process that was supposed to keep running died
    Unexpected,
}

/// Observable supervisor state.
///
/// `ready` implies a process and a port. `port`, `ready`,
/// `repository_path` and `should_be_running` are cleared together with the
/// process.
#[derive(Debug, Default)]
pub(crate) struct SupervisorState {
    pub process: Option<ProcessRecord>,
    pub port: Option<u16>,
    pub ready: bool,
    pub repository_path: Option<PathBuf>,
    pub should_be_running: bool,
    pub last_error_line: Option<String>,
    /// Launch being prepared between `begin_launch` and `register`
    pending: Option<u64>,
    /// Launch whose stderr feeds `last_error_line`; outlives the process so
    /// output drained after the exit is still kept
    error_source: u64,
    generation: u64,
}

/// Point-in-time copy of the supervisor state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupervisorStatus {
    pub running: bool,
    pub ready: bool,
    pub pid: Option<u32>,
    pub port: Option<u16>,
    pub repository_path: Option<PathBuf>,
    pub should_be_running: bool,
    pub last_error_line: Option<String>,
}

impl SupervisorState {
    pub fn is_running(&self) -> bool {
        self.process.is_some()
    }

    /// True while `generation` is the live launch.
    pub fn is_alive(&self, generation: u64) -> bool {
        self.process
            .as_ref()
            .is_some_and(|p| p.generation == generation)
    }

    /// Reserve a new launch. Returns `None` while another launch is running
    /// or being prepared.
    pub fn begin_launch(&mut self) -> Option<u64> {
        if self.process.is_some() || self.pending.is_some() {
            return None;
        }
        self.generation += 1;
        self.pending = Some(self.generation);
        self.error_source = self.generation;
        self.last_error_line = None;
        Some(self.generation)
    }

    /// Give up a reserved launch that never got a process.
    pub fn abandon_launch(&mut self, generation: u64) {
        if self.pending == Some(generation) {
            self.pending = None;
        }
    }

    /// Register the spawned process of the reserved launch.
    pub fn register(&mut self, record: ProcessRecord, repository_path: PathBuf) {
        self.pending = None;
        self.process = Some(record);
        self.port = None;
        self.ready = false;
        self.should_be_running = false;
        self.repository_path = Some(repository_path);
    }

    /// Publish the port once the service answered. Returns false when the
    /// launch is no longer current.
    pub fn mark_ready(&mut self, generation: u64, port: u16) -> bool {
        let stopping = match self.process.as_ref() {
            Some(p) if p.generation == generation => p.stopping,
            _ => return false,
        };
        self.port = Some(port);
        self.ready = true;
        self.should_be_running = !stopping;
        true
    }

    /// Record a stop request. Returns the launch to stop, if any.
    pub fn request_stop(&mut self) -> Option<(u64, u16)> {
        self.should_be_running = false;
        self.process.as_mut().map(|p| {
            p.stopping = true;
            (p.generation, p.port)
        })
    }

    /// Keep the most recent stderr line of the latest launch, including
    /// lines drained after its exit.
    pub fn record_error_line(&mut self, generation: u64, line: &str) {
        if generation == self.error_source {
            self.last_error_line = Some(line.to_string());
        }
    }

    /// Take the kill switch of `generation`, if it is still the current launch.
    pub fn take_kill(&mut self, generation: u64) -> Option<oneshot::Sender<()>> {
        self.process
            .as_mut()
            .filter(|p| p.generation == generation)
            .and_then(|p| p.kill.take())
    }

    /// Exit procedure: clear the process and everything tied to it in one
    /// step, as soon as the OS reports the exit.
    pub fn handle_exit(&mut self, generation: u64) -> ExitDisposition {
        if !self.is_alive(generation) {
            return ExitDisposition::Stale;
        }

        let unexpected = self.should_be_running && self.ready;

        self.process = None;
        self.port = None;
        self.ready = false;
        self.repository_path = None;
        self.should_be_running = false;

        if unexpected {
            ExitDisposition::Unexpected
        } else {
            ExitDisposition::Expected
        }
    }

    /// Error reported for an unexpected exit of `generation`.
    pub fn exit_error(&self, generation: u64) -> SupervisorError {
        let line = (generation == self.error_source)
            .then(|| self.last_error_line.clone())
            .flatten();
        SupervisorError::unexpected_exit(line)
    }

    pub fn status(&self) -> SupervisorStatus {
        SupervisorStatus {
            running: self.is_running(),
            ready: self.ready,
            pid: self.process.as_ref().and_then(|p| p.pid),
            port: self.port,
            repository_path: self.repository_path.clone(),
            should_be_running: self.should_be_running,
            last_error_line: self.last_error_line.clone(),
        }
    }
}
