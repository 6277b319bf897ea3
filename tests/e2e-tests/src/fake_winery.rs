//! Scenario knobs of the fake Winery binary

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Behaviour of one fake Winery launch, passed through its environment
#[derive(Debug, Clone, Default)]
pub struct FakeWineryOptions {
    pub startup_delay_ms: u64,
    pub warmup_ms: u64,
    pub crash_before_ready: bool,
    pub crash_after_ms: Option<u64>,
    pub stderr_line: Option<String>,
    pub exit_code: Option<i32>,
    pub shutdown_delay_ms: u64,
    pub args_file: Option<PathBuf>,
}

impl FakeWineryOptions {
    pub fn to_environment(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        env.insert("FAKE_WINERY_STARTUP_DELAY_MS".to_string(), self.startup_delay_ms.to_string());
        env.insert("FAKE_WINERY_WARMUP_MS".to_string(), self.warmup_ms.to_string());
        env.insert("FAKE_WINERY_SHUTDOWN_DELAY_MS".to_string(), self.shutdown_delay_ms.to_string());
        if self.crash_before_ready {
            env.insert("FAKE_WINERY_CRASH_BEFORE_READY".to_string(), "true".to_string());
        }
        if let Some(after) = self.crash_after_ms {
            env.insert("FAKE_WINERY_CRASH_AFTER_MS".to_string(), after.to_string());
        }
        if let Some(line) = &self.stderr_line {
            env.insert("FAKE_WINERY_STDERR_LINE".to_string(), line.clone());
        }
        if let Some(code) = self.exit_code {
            env.insert("FAKE_WINERY_EXIT_CODE".to_string(), code.to_string());
        }
        if let Some(path) = &self.args_file {
            env.insert("FAKE_WINERY_ARGS_FILE".to_string(), path.display().to_string());
        }
        env
    }
}
