use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};

pub mod validation;

/// Top-level launcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    #[serde(default)]
    pub launcher: LauncherOptions,
    pub service: ServiceOptions,
}

/// Supervisor tuning and storage location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherOptions {
    /// Per-user application data directory. Passed to the service as its
    /// home directory, and holds the launcher's log files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// First port tried by the port allocator
    #[serde(default = "default_baseline_port")]
    pub baseline_port: u16,

    /// Delay between readiness and stop-confirmation probes
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub poll_interval: Duration,

    /// Timeout of a single HTTP probe
    #[serde(default = "default_probe_timeout", with = "duration_serde")]
    pub probe_timeout: Duration,

    /// Optional ceiling on the readiness wait (unbounded when absent)
    #[serde(default, with = "option_duration_serde", skip_serializing_if = "Option::is_none")]
    pub ready_timeout: Option<Duration>,

    /// Optional ceiling on the stop-confirmation wait (unbounded when absent)
    #[serde(default, with = "option_duration_serde", skip_serializing_if = "Option::is_none")]
    pub stop_timeout: Option<Duration>,
}

/// How the Winery service is launched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOptions {
    #[serde(default = "default_java_path")]
    pub java_path: PathBuf,
    pub launcher_jar: PathBuf,
    pub logback_config: PathBuf,
    /// Template for winery.yml; the built-in template is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_template: Option<PathBuf>,
    /// Extra environment variables for the service process
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// Files derived from the data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherPaths {
    pub data_dir: PathBuf,
    /// `<data_dir>/.winery/winery.yml`, where the service looks for its
    /// configuration
    pub winery_config_file: PathBuf,
    /// Supervisor diagnostics
    pub backend_log: PathBuf,
    /// Raw service output
    pub service_log: PathBuf,
}

impl LauncherPaths {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            winery_config_file: data_dir.join(".winery").join("winery.yml"),
            backend_log: data_dir.join("backend.log"),
            service_log: data_dir.join("winery.log"),
        }
    }
}

impl Default for LauncherOptions {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            baseline_port: default_baseline_port(),
            poll_interval: default_poll_interval(),
            probe_timeout: default_probe_timeout(),
            ready_timeout: None,
            stop_timeout: None,
        }
    }
}

impl LauncherOptions {
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }
}

impl ServiceOptions {
    pub fn new(launcher_jar: impl Into<PathBuf>, logback_config: impl Into<PathBuf>) -> Self {
        Self {
            java_path: default_java_path(),
            launcher_jar: launcher_jar.into(),
            logback_config: logback_config.into(),
            config_template: None,
            environment: BTreeMap::new(),
        }
    }
}

impl LauncherConfig {
    pub fn new(launcher: LauncherOptions, service: ServiceOptions) -> Self {
        Self { launcher, service }
    }

    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        Self::load_from_string(&content)
    }

    /// Load configuration from a YAML string
    pub fn load_from_string(content: &str) -> Result<Self> {
        let config: LauncherConfig = serde_yaml::from_str(content)
            .context("Failed to parse YAML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    pub fn paths(&self) -> LauncherPaths {
        LauncherPaths::new(&self.launcher.data_dir)
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local/share")
        })
        .join("winery-launcher")
}

fn default_baseline_port() -> u16 {
    winery_process::DEFAULT_BASELINE_PORT
}

fn default_poll_interval() -> Duration {
    winery_monitoring::DEFAULT_POLL_INTERVAL
}

fn default_probe_timeout() -> Duration {
    winery_monitoring::DEFAULT_PROBE_TIMEOUT
}

fn default_java_path() -> PathBuf {
    PathBuf::from("java")
}

// Custom serialization for Duration
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn format_duration(duration: &Duration) -> String {
        if duration.subsec_millis() == 0 {
            format!("{}s", duration.as_secs())
        } else {
            format!("{}ms", duration.as_millis())
        }
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        // Check for "ms" BEFORE "s" since "ms" ends with 's'
        if let Some(num_str) = s.strip_suffix("ms") {
            let millis: u64 = num_str.parse().map_err(|_| format!("Invalid duration: {}", s))?;
            Ok(Duration::from_millis(millis))
        } else if let Some(num_str) = s.strip_suffix('s') {
            let secs: u64 = num_str.parse().map_err(|_| format!("Invalid duration: {}", s))?;
            Ok(Duration::from_secs(secs))
        } else if let Some(num_str) = s.strip_suffix('m') {
            let mins: u64 = num_str.parse().map_err(|_| format!("Invalid duration: {}", s))?;
            let secs = mins
                .checked_mul(60)
                .ok_or_else(|| format!("Duration out of range: {}", s))?;
            Ok(Duration::from_secs(secs))
        } else {
            Err(format!("Duration must end with 's', 'ms', or 'm': {}", s))
        }
    }
}

// Custom serialization for Option<Duration>
mod option_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_str(&super::duration_serde::format_duration(d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        match opt {
            Some(s) => super::duration_serde::parse_duration(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
