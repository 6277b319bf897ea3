//! Service command line and spawning.
//!
//! [`LaunchSpec`] describes how the Winery service is started: the Java
//! executable, the JVM properties carrying the home directory override,
//! the allocated port and the logging configuration, and the launcher
//! archive. [`LaunchSpec::spawn`] starts it with standard output and error
//! piped so the caller can read them line by line.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, info};
use winery_common::{Result, SupervisorError};

/// Complete description of a service process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub environment: BTreeMap<String, String>,
}

impl LaunchSpec {
    /// Build the Winery invocation for `port`.
    ///
    /// `home` becomes `user.home` of the JVM, which is where the service
    /// looks for `.winery/winery.yml`.
    pub fn winery(
        java_path: &Path,
        home: &Path,
        port: u16,
        logback_config: &Path,
        launcher_jar: &Path,
    ) -> Self {
        let args = vec![
            format!("-Duser.home={}", home.display()),
            "-Dorg.eclipse.jetty.LEVEL=INFO".to_string(),
            format!("-Dwinerylauncher.port={}", port),
            format!("-Dlogback.configurationFile={}", logback_config.display()),
            "-jar".to_string(),
            // Startup tuning only
            "-XX:TieredStopAtLevel=1".to_string(),
            "-noverify".to_string(),
            launcher_jar.display().to_string(),
        ];

        Self {
            program: java_path.to_path_buf(),
            args,
            environment: BTreeMap::new(),
        }
    }

    pub fn with_environment<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environment
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Human readable program name for logs and errors.
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Build the tokio command with piped standard streams.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.environment {
            cmd.env(key, value);
        }

        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        // Keep console control events of the launcher away from the service.
        #[cfg(windows)]
        {
            const CREATE_NEW_PROCESS_GROUP: u32 = 0x00000200;
            cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
        }

        cmd
    }

    /// Spawn the process. Returns as soon as the OS process exists.
    pub fn spawn(&self) -> Result<Child> {
        debug!("Spawning {} {:?}", self.program_name(), self.args);

        let child = self
            .to_command()
            .spawn()
            .map_err(|e| SupervisorError::spawn_failed(self.program_name(), e))?;

        info!(
            "Process spawned: {} (PID: {})",
            self.program_name(),
            child.id().unwrap_or(0)
        );
        Ok(child)
    }
}
