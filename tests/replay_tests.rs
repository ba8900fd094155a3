// Unit tests for replay module
//
// Tests the core functionality of the replay engine including:
// - Loading JSONL log files (ordering, blank lines, bad lines)
// - Replaying individual turns
// - Validating expected moves
// - Generating statistics

use std::path::PathBuf;
use tail_chaser::config::Config;
use tail_chaser::replay::ReplayEngine;
use tail_chaser::types::Direction;

/// Helper function to get the path to test fixtures
fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(filename)
}

fn engine() -> ReplayEngine {
    ReplayEngine::new(Config::default_hardcoded(), false, 0)
}

#[test]
fn test_load_log_file_sorts_by_turn() {
    let entries = engine()
        .load_log_file(fixture_path("short_game.jsonl"))
        .expect("Failed to load short_game.jsonl");

    assert_eq!(entries.len(), 4, "Blank lines should be skipped");
    let turns: Vec<u64> = entries.iter().map(|e| e.turn).collect();
    assert_eq!(turns, vec![0, 1, 2, 3]);
    assert_eq!(entries[0].chosen_move, Direction::Down);
    assert_eq!(entries[0].body, vec![5]);
    assert_eq!(entries[0].foods, vec![15]);
}

#[test]
fn test_load_log_file_reports_bad_line() {
    let err = engine()
        .load_log_file(fixture_path("malformed.jsonl"))
        .unwrap_err();
    assert!(err.contains("line 2"), "unexpected error: {}", err);
}

#[test]
fn test_load_missing_file() {
    assert!(engine()
        .load_log_file(fixture_path("does_not_exist.jsonl"))
        .is_err());
}

#[test]
fn test_replay_turns_flags_illegal_logged_move() {
    let engine = engine();
    let entries = engine
        .load_log_file(fixture_path("short_game.jsonl"))
        .unwrap();

    let results = engine.replay_turns(&entries, &[0, 3]).unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].original_legal);

    // Turn 3 drove right into the east wall; the bot never would
    let crash = &results[1];
    assert_eq!(crash.turn, 3);
    assert!(!crash.original_legal);
    assert!(!crash.matches);
    assert!(matches!(crash.replayed_move, Direction::Up | Direction::Down));
}

#[test]
fn test_replay_turns_missing_turn_is_an_error() {
    let engine = engine();
    let entries = engine
        .load_log_file(fixture_path("short_game.jsonl"))
        .unwrap();
    assert!(engine.replay_turns(&entries, &[42]).is_err());
}

#[test]
fn test_stats_over_whole_log() {
    let engine = engine();
    let entries = engine
        .load_log_file(fixture_path("short_game.jsonl"))
        .unwrap();
    let results = engine.replay_all(&entries).unwrap();
    let stats = engine.generate_stats(&results);

    assert_eq!(stats.total_turns, 4);
    assert_eq!(stats.matches + stats.mismatches, 4);
    assert!(stats.mismatches >= 1);
    assert_eq!(stats.illegal_original_moves, 1);
    assert_eq!(stats.no_escape_turns, 0);
}

#[test]
fn test_validate_expected_moves_from_fixture() {
    let engine = engine();
    let entries = engine
        .load_log_file(fixture_path("short_game.jsonl"))
        .unwrap();

    assert!(engine
        .validate_expected_moves(
            &entries,
            &[(0, vec![Direction::Down]), (1, vec![Direction::Right, Direction::Up])]
        )
        .is_ok());

    let err = engine
        .validate_expected_moves(&entries, &[(2, vec![Direction::Down])])
        .unwrap_err();
    assert!(err.contains("Turn 2"));
}
