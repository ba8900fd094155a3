// Integration tests for replay binary
//
// Tests the replay binary CLI behavior:
// - Command-line argument parsing
// - File loading and error handling
// - Different replay modes (--all, --turns, --validate)
// - Output formatting

use std::path::PathBuf;
use std::process::Command;

/// Helper function to get the path to test fixtures
fn fixture_path(filename: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(filename)
        .to_string_lossy()
        .to_string()
}

/// Helper to run replay binary with arguments
fn run_replay(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_replay"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(args)
        .output()
        .expect("Failed to execute replay binary")
}

#[test]
fn test_replay_help() {
    let output = run_replay(&["--help"]);
    assert!(output.status.success(), "Help command should succeed");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("USAGE"), "Help should show usage");
    assert!(stderr.contains("--turns"), "Help should list --turns");
}

#[test]
fn test_replay_requires_log_file() {
    let output = run_replay(&[]);
    assert!(!output.status.success(), "Missing log file should fail");
}

#[test]
fn test_replay_requires_mode() {
    let log = fixture_path("short_game.jsonl");
    let output = run_replay(&[log.as_str()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Must specify"));
}

#[test]
fn test_replay_all_prints_report() {
    let log = fixture_path("short_game.jsonl");
    let output = run_replay(&[log.as_str(), "--all"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("REPLAY REPORT"));
    assert!(stdout.contains("Total Turns:    4"));
    assert!(stdout.contains("Illegal moves:  1"));
}

#[test]
fn test_replay_specific_turns() {
    let log = fixture_path("short_game.jsonl");
    let output = run_replay(&[log.as_str(), "--turns", "0,2", "--seed", "11"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Replaying 2 specific turn(s)"));
    assert!(stdout.contains("Total Turns:    2"));
}

#[test]
fn test_replay_invalid_turns_argument() {
    let log = fixture_path("short_game.jsonl");
    let output = run_replay(&[log.as_str(), "--turns", "zero"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid turn number"));
}

#[test]
fn test_validate_passes_and_fails() {
    let log = fixture_path("short_game.jsonl");

    let ok = run_replay(&[log.as_str(), "--validate", "0:down,1:right|up"]);
    assert!(ok.status.success());
    assert!(String::from_utf8_lossy(&ok.stdout).contains("validated successfully"));

    let bad = run_replay(&[log.as_str(), "--validate", "2:left"]);
    assert!(!bad.status.success());
    assert!(String::from_utf8_lossy(&bad.stderr).contains("Validation failed"));
}

#[test]
fn test_replay_missing_log_file() {
    let output = run_replay(&["no_such_log.jsonl", "--all"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error loading log file"));
}

#[test]
fn test_unknown_option_is_rejected() {
    let log = fixture_path("short_game.jsonl");
    let output = run_replay(&[log.as_str(), "--all", "--frobnicate"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown option"));
}
