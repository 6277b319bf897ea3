//! Test Scenario 3.2: Unexpected Exit
//!
//! A ready service that dies on its own is reported exactly once, with its
//! last standard error line.

use e2e_tests::assertions::{assert_ready, assert_stopped, within};
use e2e_tests::{FakeWineryOptions, TestExecutor};
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use winery_supervisor::{SupervisorError, SupervisorEvent};

const BASELINE_PORT: u16 = 38600;
const LAST_LINE: &str = "java.lang.OutOfMemoryError: Java heap space";

#[tokio::test(flavor = "multi_thread")]
async fn test_unexpected_exit_is_reported_once() {
    println!("\n========================================");
    println!("TEST: Unexpected Exit");
    println!("========================================\n");

    let executor = TestExecutor::new("unexpected-exit");
    let options = FakeWineryOptions {
        crash_after_ms: Some(1500),
        stderr_line: Some(LAST_LINE.to_string()),
        exit_code: Some(7),
        ..Default::default()
    };
    let (supervisor, _output) = executor.supervisor(executor.config(BASELINE_PORT, &options));
    let mut events = supervisor.subscribe();

    println!("Step 1: Starting...");
    supervisor.start(executor.repository()).await.expect("start should succeed");
    let port = assert_ready(&supervisor, BASELINE_PORT).unwrap();
    println!("✓ Ready on port {}\n", port);

    println!("Step 2: Waiting for the crash notification...");
    let event = within(Duration::from_secs(30), "crash notification", events.recv())
        .await
        .unwrap()
        .expect("event channel should stay open");

    let SupervisorEvent::UnexpectedExit { error, exit } = event;
    println!("Received: {} ({})", error, exit);
    assert_eq!(
        error,
        SupervisorError::UnexpectedExit {
            last_error_line: Some(LAST_LINE.to_string())
        }
    );
    assert_eq!(exit.code, Some(7));
    println!("✓ Crash reported with the last error line\n");

    println!("Step 3: Verifying state...");
    assert_stopped(&supervisor).unwrap();
    assert_eq!(supervisor.backend_url(), Err(SupervisorError::NotRunning));
    assert_eq!(supervisor.last_error_line().as_deref(), Some(LAST_LINE));
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    println!("✓ Reported exactly once\n");

    println!("Step 4: Stop after the crash is a no-op...");
    within(Duration::from_secs(2), "stop", supervisor.stop()).await.unwrap();
    assert_stopped(&supervisor).unwrap();
    println!("✓ Stop returned\n");

    executor.cleanup();
    println!("✓ TEST PASSED: Unexpected Exit");
}
