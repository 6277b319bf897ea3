//! Test Scenario 1.2: Graceful Stop
//!
//! The fake Winery keeps answering for a while after the shutdown call;
//! stop must only return once it no longer accepts connections.

use e2e_tests::assertions::{assert_ready, assert_stopped, wait_for_port_closed, wait_until, within};
use e2e_tests::{FakeWineryOptions, TestExecutor};
use std::time::{Duration, Instant};

const BASELINE_PORT: u16 = 38300;

#[tokio::test(flavor = "multi_thread")]
async fn test_stop_waits_for_unreachable() {
    println!("\n========================================");
    println!("TEST: Graceful Stop");
    println!("========================================\n");

    let executor = TestExecutor::new("graceful-stop");
    let options = FakeWineryOptions {
        shutdown_delay_ms: 1000,
        ..Default::default()
    };
    let (supervisor, output) = executor.supervisor(executor.config(BASELINE_PORT, &options));
    let mut events = supervisor.subscribe();

    println!("Step 1: Starting...");
    supervisor.start(executor.repository()).await.expect("start should succeed");
    let port = assert_ready(&supervisor, BASELINE_PORT).unwrap();
    println!("✓ Ready on port {}\n", port);

    println!("Step 2: Stopping (service lingers for 1s)...");
    let started = Instant::now();
    within(Duration::from_secs(30), "stop", supervisor.stop()).await.unwrap();
    let elapsed = started.elapsed();
    println!("Stop returned after {:?}", elapsed);
    assert!(elapsed >= Duration::from_millis(800), "stop returned too early: {:?}", elapsed);
    wait_for_port_closed(port, Duration::from_secs(5)).await.unwrap();
    println!("✓ Stop waited for the service to go away\n");

    println!("Step 3: Verifying state and notifications...");
    wait_until(Duration::from_secs(5), || !supervisor.running()).await.unwrap();
    assert_stopped(&supervisor).unwrap();
    assert!(events.try_recv().is_err());
    assert!(output.messages().iter().any(|line| line.contains("Winery stopped")));
    println!("✓ Clean stop\n");

    executor.cleanup();
    println!("✓ TEST PASSED: Graceful Stop");
}
