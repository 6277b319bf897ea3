//! Test Scenario 2.2: Already Running
//!
//! A second start while a service runs is refused and changes nothing.

use e2e_tests::assertions::assert_ready;
use e2e_tests::{FakeWineryOptions, TestExecutor};
use winery_supervisor::SupervisorError;

const BASELINE_PORT: u16 = 38700;

#[tokio::test(flavor = "multi_thread")]
async fn test_second_start_is_refused() {
    println!("\n========================================");
    println!("TEST: Already Running");
    println!("========================================\n");

    let executor = TestExecutor::new("already-running");
    let (supervisor, _output) =
        executor.supervisor(executor.config(BASELINE_PORT, &FakeWineryOptions::default()));

    println!("Step 1: Starting...");
    supervisor.start(executor.repository()).await.expect("start should succeed");
    let port = assert_ready(&supervisor, BASELINE_PORT).unwrap();
    let config_before = std::fs::read_to_string(&supervisor.paths().winery_config_file).unwrap();
    println!("✓ Ready on port {}\n", port);

    println!("Step 2: Starting again with another repository...");
    let err = supervisor
        .start(executor.test_dir.join("other-repository"))
        .await
        .unwrap_err();
    assert_eq!(err, SupervisorError::AlreadyRunning);
    println!("✓ Refused: {}\n", err);

    println!("Step 3: Verifying nothing changed...");
    assert_eq!(assert_ready(&supervisor, BASELINE_PORT).unwrap(), port);
    assert_eq!(supervisor.repository_path(), Some(executor.repository()));
    let config_after = std::fs::read_to_string(&supervisor.paths().winery_config_file).unwrap();
    assert_eq!(config_before, config_after);
    println!("✓ State and configuration untouched\n");

    supervisor.stop().await;
    executor.cleanup();
    println!("✓ TEST PASSED: Already Running");
}
