//! Integration tests for the tasplay CLI

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::helpers::{fixtures_dir, run_tasplay};

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).display().to_string()
}

// ============================================================================
// Help Output Tests
// ============================================================================

#[test]
fn play_help_exits_0_and_shows_usage() {
    let dir = TempDir::new().unwrap();
    let (stdout, _stderr, exit_code) = run_tasplay(&["play", "--help"], &dir.path().join("c.toml"));

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("<SCRIPT>"));
    assert!(stdout.contains("--mode"));
    assert!(stdout.contains("compressed"));
}

#[test]
fn version_flag_prints_version() {
    Command::cargo_bin("tasplay")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("tasplay "));
}

// ============================================================================
// Play Tests
// ============================================================================

#[test]
fn play_trace_sync() {
    let dir = TempDir::new().unwrap();
    let script = fixture("mixed.txt");
    let (stdout, stderr, exit_code) = run_tasplay(
        &["play", &script, "--mode", "sync", "--unthrottled", "--trace"],
        &dir.path().join("config.toml"),
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(stderr.contains("Played 8 ticks in sync mode"));
    insta::assert_snapshot!("play_trace_mixed_sync", stdout);
}

#[test]
fn precompiled_trace_matches_sync() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    let script = fixture("mixed.txt");

    let (sync_out, _, _) = run_tasplay(
        &["play", &script, "--mode", "sync", "--unthrottled", "--trace"],
        &config,
    );
    for mode in ["precompile", "compressed"] {
        let (out, stderr, exit_code) = run_tasplay(
            &["play", &script, "--mode", mode, "--unthrottled", "--trace"],
            &config,
        );
        assert_eq!(exit_code, 0, "stderr: {}", stderr);

        let sync_lines: Vec<&str> = sync_out.lines().collect();
        let lines: Vec<&str> = out.lines().collect();
        // The precompiled run spends one more tick noticing the drained buffer
        assert_eq!(lines.len(), sync_lines.len() + 1);
        assert_eq!(lines[..sync_lines.len()], sync_lines[..]);
        assert_eq!(lines[sync_lines.len()], "8 - L 0@0 R 0@0");
    }
}

#[test]
fn play_max_ticks_limits_looping_run() {
    let dir = TempDir::new().unwrap();
    let script = fixture("three_a.txt");
    let (stdout, stderr, exit_code) = run_tasplay(
        &[
            "play",
            &script,
            "--loop",
            "--unthrottled",
            "--trace",
            "--max-ticks",
            "20",
        ],
        &dir.path().join("config.toml"),
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert_eq!(stdout.lines().count(), 21);
    assert!(stdout.lines().all(|l| l.contains(" A L ")));
    assert!(stderr.contains("3 loops"));
}

#[test]
fn play_uses_configured_mode() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[playback]\nparsing_mode = \"compressed\"\n").unwrap();

    let (_stdout, stderr, exit_code) =
        run_tasplay(&["play", &fixture("three_a.txt"), "--unthrottled"], &config);

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(stderr.contains("in compressed mode"));
}

#[test]
fn play_missing_script_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.txt").display().to_string();
    let (_stdout, stderr, exit_code) =
        run_tasplay(&["play", &missing], &dir.path().join("config.toml"));

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("Failed to read script"));
}

#[test]
fn play_rejects_unknown_mode() {
    let dir = TempDir::new().unwrap();
    let (_stdout, stderr, exit_code) = run_tasplay(
        &["play", &fixture("three_a.txt"), "--mode", "turbo"],
        &dir.path().join("config.toml"),
    );

    assert_eq!(exit_code, 2);
    assert!(stderr.contains("invalid value"));
}

// ============================================================================
// Compile Tests
// ============================================================================

#[test]
fn compile_json_reports_frames() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, exit_code) = run_tasplay(
        &["compile", &fixture("three_a.txt"), "--compressed", "--json"],
        &dir.path().join("config.toml"),
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["mode"], "compressed");
    assert_eq!(report["frames"], 3);
    assert_eq!(report["script_lines"], 3);
}

#[test]
fn compile_reports_malformed_lines() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, exit_code) = run_tasplay(
        &["compile", &fixture("malformed.txt")],
        &dir.path().join("config.toml"),
    );

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("Frames:   2 of 4 lines"));
    assert!(stderr.contains("2 script line(s) could not be compiled"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn config_path_honours_env_override() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.toml");
    let (stdout, _stderr, exit_code) = run_tasplay(&["config", "path"], &config);

    assert_eq!(exit_code, 0);
    assert_eq!(stdout.trim(), config.display().to_string());
}

#[test]
fn config_init_writes_defaults_once() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("sub").join("config.toml");

    let (_stdout, _stderr, exit_code) = run_tasplay(&["config", "init"], &config);
    assert_eq!(exit_code, 0);
    let written = std::fs::read_to_string(&config).unwrap();
    assert!(written.contains("parsing_mode = \"sync\""));

    let (_stdout, stderr, exit_code) = run_tasplay(&["config", "init"], &config);
    assert_eq!(exit_code, 1);
    assert!(stderr.contains("already exists"));

    let (_stdout, _stderr, exit_code) = run_tasplay(&["config", "init", "--force"], &config);
    assert_eq!(exit_code, 0);
}

#[test]
fn config_show_prints_toml() {
    let dir = TempDir::new().unwrap();
    let (stdout, _stderr, exit_code) =
        run_tasplay(&["config", "show"], &dir.path().join("config.toml"));

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("[playback]"));
    assert!(stdout.contains("frame_rate = 60"));
}
