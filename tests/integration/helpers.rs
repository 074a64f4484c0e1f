//! Shared helpers for integration tests

use std::path::{Path, PathBuf};
use std::process::Command;

/// Directory holding the script fixtures.
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Read a fixture script.
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_dir().join(name)).expect("Failed to read fixture")
}

/// Run the tasplay binary with `config` as its config file.
///
/// Returns (stdout, stderr, exit code).
pub fn run_tasplay(args: &[&str], config: &Path) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_tasplay"))
        .args(args)
        .env("TASPLAY_CONFIG", config)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute tasplay");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}
