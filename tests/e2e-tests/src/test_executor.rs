use crate::fake_winery::FakeWineryOptions;
use crate::{cleanup_test_dir, create_test_dir, get_fake_winery_path};
use std::path::PathBuf;
use std::time::Duration;
use winery_log_collection::{MemoryOutputWriter, ServiceLog};
use winery_supervisor::{LauncherConfig, LauncherOptions, ServiceOptions, Supervisor};

/// Sets up a test directory and supervisors driving the fake Winery
pub struct TestExecutor {
    pub test_name: String,
    pub test_dir: PathBuf,
    pub fake_winery_path: PathBuf,
}

impl TestExecutor {
    /// Create a new test executor
    pub fn new(test_name: &str) -> Self {
        let test_dir = create_test_dir(test_name);
        let fake_winery_path = get_fake_winery_path();

        println!("=== Test Executor Setup ===");
        println!("Test: {}", test_name);
        println!("Test dir: {}", test_dir.display());
        println!("FAKE WINERY: {}", fake_winery_path.display());
        println!("===========================\n");

        Self {
            test_name: test_name.to_string(),
            test_dir,
            fake_winery_path,
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.test_dir.join("data")
    }

    pub fn repository(&self) -> PathBuf {
        self.test_dir.join("repository")
    }

    /// Launcher configuration that runs the fake Winery in place of the JVM
    pub fn config(&self, baseline_port: u16, options: &FakeWineryOptions) -> LauncherConfig {
        let mut launcher = LauncherOptions::default().with_data_dir(self.data_dir());
        launcher.baseline_port = baseline_port;
        launcher.poll_interval = Duration::from_millis(100);
        launcher.probe_timeout = Duration::from_secs(1);
        launcher.ready_timeout = Some(Duration::from_secs(20));
        launcher.stop_timeout = Some(Duration::from_secs(20));

        let mut service = ServiceOptions::new(
            self.test_dir.join("winery-launcher.jar"),
            self.test_dir.join("logback.xml"),
        );
        service.java_path = self.fake_winery_path.clone();
        service.environment = options.to_environment();

        LauncherConfig::new(launcher, service)
    }

    /// Supervisor whose service output is kept in memory
    pub fn supervisor(&self, config: LauncherConfig) -> (Supervisor, MemoryOutputWriter) {
        let output = MemoryOutputWriter::new(1000);
        let log = ServiceLog::new().with_output(output.clone());
        (Supervisor::with_service_log(config, log), output)
    }

    pub fn cleanup(&self) {
        cleanup_test_dir(&self.test_dir);
    }
}
