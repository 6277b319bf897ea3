//! Test Scenario 2.1: Port Allocation
//!
//! An occupied baseline port pushes the service to the next free port.

use e2e_tests::assertions::{assert_config_matches, assert_ready};
use e2e_tests::{FakeWineryOptions, TestExecutor};
use std::net::TcpListener;

const BASELINE_PORT: u16 = 38400;

#[tokio::test(flavor = "multi_thread")]
async fn test_busy_baseline_port_is_skipped() {
    println!("\n========================================");
    println!("TEST: Port Allocation");
    println!("========================================\n");

    println!("Step 1: Occupying port {}...", BASELINE_PORT);
    let _blocker = TcpListener::bind(("127.0.0.1", BASELINE_PORT)).expect("baseline port should be free");
    println!("✓ Baseline port occupied\n");

    let executor = TestExecutor::new("port-allocation");
    let (supervisor, _output) =
        executor.supervisor(executor.config(BASELINE_PORT, &FakeWineryOptions::default()));

    println!("Step 2: Starting...");
    supervisor.start(executor.repository()).await.expect("start should succeed");
    let port = assert_ready(&supervisor, BASELINE_PORT).unwrap();
    assert!(port > BASELINE_PORT, "port {} should skip the occupied baseline", port);
    assert_config_matches(&supervisor.paths().winery_config_file, port, &executor.repository()).unwrap();
    println!("✓ Started on port {}\n", port);

    supervisor.stop().await;
    executor.cleanup();
    println!("✓ TEST PASSED: Port Allocation");
}
