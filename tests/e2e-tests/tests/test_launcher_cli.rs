//! Test Scenario 4.1: Launcher CLI
//!
//! Runs the winery-launcher binary against the fake Winery for a fixed
//! duration and checks its diagnostics.

use e2e_tests::{get_launcher_path, FakeWineryOptions, LauncherWrapper, TestExecutor};
use std::time::Duration;

const BASELINE_PORT: u16 = 38800;

#[test]
fn test_launcher_runs_and_stops() {
    println!("\n========================================");
    println!("TEST: Launcher CLI");
    println!("========================================\n");

    let Some(launcher_path) = get_launcher_path() else {
        println!("winery-launcher binary not built, skipping");
        return;
    };

    let executor = TestExecutor::new("launcher-cli");
    let config = executor.config(BASELINE_PORT, &FakeWineryOptions::default());
    let config_path = executor.test_dir.join("launcher.yml");
    std::fs::write(&config_path, serde_yaml::to_string(&config).unwrap()).unwrap();

    println!("Step 1: Running the launcher for 2 seconds...");
    let mut launcher = LauncherWrapper::new(config_path, executor.test_dir.clone());
    launcher
        .start(&launcher_path, &executor.repository(), 2)
        .unwrap();
    launcher
        .wait_for_log("Winery available at http://localhost:", Duration::from_secs(30))
        .unwrap();
    println!("✓ Launcher reported the Winery URL\n");

    println!("Step 2: Waiting for the launcher to stop the Winery and exit...");
    let status = launcher.wait_for_exit(Duration::from_secs(30)).unwrap();
    assert!(status.success(), "launcher exited with {:?}", status);
    assert!(launcher.get_logs().iter().any(|line| line.contains("Winery stopped!")));
    println!("✓ Launcher exited cleanly\n");

    println!("Step 3: Checking the backend log...");
    let backend_log = std::fs::read_to_string(executor.data_dir().join("backend.log")).unwrap();
    assert!(backend_log.contains("Starting the Winery on port"));
    let service_log = std::fs::read_to_string(executor.data_dir().join("winery.log")).unwrap();
    assert!(service_log.contains("Starting Winery on port"));
    println!("✓ Logs written to the data directory\n");

    executor.cleanup();
    println!("✓ TEST PASSED: Launcher CLI");
}
