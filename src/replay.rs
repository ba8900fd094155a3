// Replay module for analyzing logged games and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Rebuild a bot from each logged state and rerun the search
// 3. Compare logged vs replayed moves and check both are legal
// 4. Generate summary reports

use log::{info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::bot::Bot;
use crate::config::Config;
use crate::debug_logger::LogEntry;
use crate::grid::Grid;
use crate::search::Outcome;
use crate::types::Direction;

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: u64,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub matches: bool,
    /// Whether the logged move was a legal, non-colliding move
    pub original_legal: bool,
    pub replayed_outcome: Outcome,
    pub search_depth: usize,
    pub computation_time_us: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
    pub illegal_original_moves: usize,
    pub no_escape_turns: usize,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
    seed: u64,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    /// Tie-breaks are drawn from a fresh `StdRng` seeded with `seed` per turn
    pub fn new(config: Config, verbose: bool, seed: u64) -> Self {
        ReplayEngine {
            config,
            verbose,
            seed,
        }
    }

    /// Loads all log entries from a JSONL file, ordered by turn
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line).map_err(|e| {
                format!("Failed to parse JSON on line {}: {}", line_num + 1, e)
            })?;

            entries.push(entry);
        }

        // Writers are fire-and-forget tasks, so lines can land out of order
        entries.sort_by_key(|e| e.turn);

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Reruns the bot on one logged state
    /// Returns the replayed move, the search outcome and the elapsed time
    pub fn replay_turn(&self, entry: &LogEntry) -> Result<(Direction, Outcome, u128), String> {
        let head = *entry
            .body
            .last()
            .ok_or_else(|| format!("Turn {}: logged body is empty", entry.turn))?;

        let mut bot = Bot::new(
            entry.grid,
            head,
            entry.heading,
            &entry.foods,
            Some(entry.body.as_slice()),
            self.config.search.clone(),
            self.seed,
        )?;

        let start_time = Instant::now();
        let decision = bot.step_decision(entry.new_food, entry.search_depth)?;
        let computation_time = start_time.elapsed().as_micros();

        Ok((decision.direction, decision.outcome, computation_time))
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let (replayed_move, replayed_outcome, computation_time) = self.replay_turn(entry)?;
        let original_move = entry.chosen_move;
        let matches = original_move == replayed_move;
        let original_legal = is_legal_move(&entry.grid, &entry.body, entry.heading, original_move);

        let result = ReplayResult {
            turn: entry.turn,
            original_move,
            replayed_move,
            matches,
            original_legal,
            replayed_outcome,
            search_depth: entry.search_depth,
            computation_time_us: computation_time,
        };

        if self.verbose {
            if matches {
                info!(
                    "Turn {}: ✓ MATCH - {} ({:?}, time: {}µs)",
                    entry.turn, replayed_move, replayed_outcome, computation_time
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {}, Replayed: {} ({:?}, time: {}µs)",
                    entry.turn, original_move, replayed_move, replayed_outcome, computation_time
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[LogEntry]) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", entry.turn, e);
                }
            }
        }

        Ok(results)
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[LogEntry],
        turn_numbers: &[u64],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or_else(|| format!("Turn {} not found in log file", turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", turn_num, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
            illegal_original_moves: results.iter().filter(|r| !r.original_legal).count(),
            no_escape_turns: results
                .iter()
                .filter(|r| r.replayed_outcome == Outcome::NoEscape)
                .count(),
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("Illegal moves:  {}", stats.illegal_original_moves);
        println!("No-escape:      {}", stats.no_escape_turns);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results.iter().map(|r| r.computation_time_us as f64).sum::<f64>()
                / results.len() as f64;
            let avg_depth: f64 =
                results.iter().map(|r| r.search_depth as f64).sum::<f64>() / results.len() as f64;

            println!("Average Requested Depth:    {:.1}", avg_depth);
            println!("Average Computation Time:   {:.1}µs\n", avg_time);
        }

        // Show mismatches in detail
        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Turn {}: {} → {} ({:?}, time: {}µs)",
                    result.turn,
                    result.original_move,
                    result.replayed_move,
                    result.replayed_outcome,
                    result.computation_time_us
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected_moves: &[(u64, Vec<Direction>)], // (turn, acceptable_moves)
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            if !acceptable.contains(&entry.chosen_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    entry.chosen_move
                ));
            }
        }

        Ok(())
    }
}

/// True when `direction` is a non-reversing, in-bounds move that does not
/// hit the body (the tail counts as free since it vacates)
pub fn is_legal_move(grid: &Grid, body: &[usize], heading: Direction, direction: Direction) -> bool {
    let (Some(&head), Some(&tail)) = (body.last(), body.first()) else {
        return false;
    };
    let occupied: HashSet<usize> = body.iter().copied().collect();
    let heading = if body.len() > 1 { Some(heading) } else { None };
    let legal = grid
        .legal_moves(head, heading, &occupied, Some(tail))
        .any(|(dir, _)| dir == direction);
    legal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(turn: u64, chosen_move: Direction) -> LogEntry {
        LogEntry {
            turn,
            chosen_move,
            grid: Grid::new(4, 4),
            body: vec![4, 5],
            heading: Direction::Right,
            foods: vec![15],
            new_food: None,
            search_depth: 2,
            timestamp: String::new(),
        }
    }

    #[test]
    fn test_is_legal_move() {
        let grid = Grid::new(4, 4);
        assert!(is_legal_move(&grid, &[4, 5], Direction::Right, Direction::Right));
        assert!(is_legal_move(&grid, &[4, 5], Direction::Right, Direction::Up));
        // Reversing onto the neck
        assert!(!is_legal_move(&grid, &[4, 5], Direction::Right, Direction::Left));
        // Off the left edge
        assert!(!is_legal_move(&grid, &[5, 4], Direction::Left, Direction::Left));
        assert!(!is_legal_move(&grid, &[], Direction::Left, Direction::Left));
        // The tail vacates, any other body cell does not
        assert!(is_legal_move(&grid, &[1, 0, 4, 5], Direction::Right, Direction::Up));
        assert!(!is_legal_move(&grid, &[2, 1, 0, 4, 5], Direction::Right, Direction::Up));
    }

    #[test]
    fn test_replay_entry_produces_legal_move() {
        let engine = ReplayEngine::new(Config::default_hardcoded(), false, 0);
        let result = engine.replay_entry(&entry(7, Direction::Right)).unwrap();
        assert_eq!(result.turn, 7);
        assert!(result.original_legal);
        assert!(is_legal_move(
            &Grid::new(4, 4),
            &[4, 5],
            Direction::Right,
            result.replayed_move
        ));
    }

    #[test]
    fn test_validate_expected_moves() {
        let engine = ReplayEngine::new(Config::default_hardcoded(), false, 0);
        let entries = vec![entry(0, Direction::Right), entry(1, Direction::Up)];
        assert!(engine
            .validate_expected_moves(&entries, &[(0, vec![Direction::Right])])
            .is_ok());
        assert!(engine
            .validate_expected_moves(&entries, &[(1, vec![Direction::Down, Direction::Up])])
            .is_ok());
        assert!(engine
            .validate_expected_moves(&entries, &[(1, vec![Direction::Down])])
            .is_err());
        assert!(engine
            .validate_expected_moves(&entries, &[(9, vec![Direction::Down])])
            .is_err());
    }

    #[test]
    fn test_generate_stats() {
        let engine = ReplayEngine::new(Config::default_hardcoded(), false, 0);
        let results = vec![
            engine.replay_entry(&entry(0, Direction::Right)).unwrap(),
            engine.replay_entry(&entry(1, Direction::Left)).unwrap(),
        ];
        let stats = engine.generate_stats(&results);
        assert_eq!(stats.total_turns, 2);
        assert_eq!(stats.matches + stats.mismatches, 2);
        // Left reverses into the neck, so the replayed move can never match it
        assert!(!results[1].matches);
        assert_eq!(stats.illegal_original_moves, 1);
    }
}
