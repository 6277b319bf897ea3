// E2E Test Framework for the Winery supervisor

pub mod fake_winery;
pub mod test_executor;

pub use fake_winery::FakeWineryOptions;
pub use launcher::LauncherWrapper;
pub use test_executor::TestExecutor;

use std::env;
use std::path::{Path, PathBuf};

/// Directory holding the binaries built for the current test run
fn target_bin_dir() -> PathBuf {
    let mut path = env::current_exe()
        .expect("Failed to get current exe path")
        .parent()
        .expect("Failed to get parent dir")
        .to_path_buf();

    // If we're in deps/, go up one level
    if path.ends_with("deps") {
        path.pop();
    }
    path
}

fn binary_path(name: &str) -> PathBuf {
    let mut path = target_bin_dir();

    #[cfg(windows)]
    path.push(format!("{}.exe", name));

    #[cfg(not(windows))]
    path.push(name);

    path
}

/// Get the path to the fake Winery binary
pub fn get_fake_winery_path() -> PathBuf {
    let path = binary_path("fake-winery");
    if !path.exists() {
        panic!("fake-winery binary not found at: {}", path.display());
    }
    path
}

/// Get the path to the winery-launcher binary, if it was built
pub fn get_launcher_path() -> Option<PathBuf> {
    let path = binary_path("winery-launcher");
    path.exists().then_some(path)
}

/// Create a temporary test directory
pub fn create_test_dir(test_name: &str) -> PathBuf {
    // Use target/tmp instead of system temp to avoid path issues
    let temp_dir = target_bin_dir()
        .parent()
        .expect("Failed to get target dir")
        .join("tmp")
        .join(format!("e2e-test-{}", test_name));

    if temp_dir.exists() {
        std::fs::remove_dir_all(&temp_dir).ok();
    }
    std::fs::create_dir_all(&temp_dir).expect("Failed to create test directory");
    temp_dir
}

/// Clean up test directory
pub fn cleanup_test_dir(dir: &Path) {
    if dir.exists() {
        std::fs::remove_dir_all(dir).ok();
    }
}
