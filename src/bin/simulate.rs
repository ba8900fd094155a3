// Batch simulator: plays many seeded games in parallel and summarizes them
//
// Usage:
//   cargo run --release --bin simulate -- [--games <n>] [--seed <base>] [--config <path>]

use log::info;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::env;
use std::process;
use std::time::Instant;

use tail_chaser::config::Config;
use tail_chaser::debug_logger::DebugLogger;
use tail_chaser::game::{run_game, GameResult, GameSummary};
use tail_chaser::simple_profiler;

struct Options {
    games: Option<usize>,
    base_seed: Option<u64>,
    config_path: String,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        games: None,
        base_seed: None,
        config_path: "Snake.toml".to_string(),
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--games" => {
                let value = value.ok_or("--games requires an argument")?;
                options.games = Some(
                    value
                        .parse()
                        .map_err(|e| format!("Invalid game count '{}': {}", value, e))?,
                );
            }
            "--seed" => {
                let value = value.ok_or("--seed requires an argument")?;
                options.base_seed = Some(
                    value
                        .parse()
                        .map_err(|e| format!("Invalid seed '{}': {}", value, e))?,
                );
            }
            "--config" => {
                options.config_path = value.ok_or("--config requires an argument")?.clone();
            }
            other => return Err(format!("Unknown option '{}'", other)),
        }
        i += 2;
    }

    Ok(options)
}

fn print_summary(summaries: &[GameSummary], elapsed_ms: u128) {
    let mut by_result: BTreeMap<String, usize> = BTreeMap::new();
    for summary in summaries {
        *by_result.entry(format!("{:?}", summary.result)).or_insert(0) += 1;
    }

    let games = summaries.len().max(1) as f64;
    let avg_score = summaries.iter().map(|s| s.score as f64).sum::<f64>() / games;
    let avg_turns = summaries.iter().map(|s| s.turns as f64).sum::<f64>() / games;
    let wins = summaries
        .iter()
        .filter(|s| s.result == GameResult::Won)
        .count();

    println!("\n═══════════════════════════════════════════════════════════");
    println!("                  SIMULATION SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    println!("Games:          {}", summaries.len());
    println!("Wins:           {} ({:.1}%)", wins, 100.0 * wins as f64 / games);
    println!("Average score:  {:.1}", avg_score);
    println!("Average turns:  {:.1}", avg_turns);
    println!("Wall time:      {}ms", elapsed_ms);
    for (result, count) in &by_result {
        println!("  {:<12}  {}", result, count);
    }
    println!("═══════════════════════════════════════════════════════════\n");

    for summary in summaries {
        println!(
            "seed {:>6}: {:?}  score {:>4}  turns {:>6}",
            summary.seed, summary.result, summary.score, summary.turns
        );
    }
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!("Usage: simulate [--games <n>] [--seed <base>] [--config <path>]");
        process::exit(1);
    });

    let config = Config::from_file(&options.config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", options.config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    let games = options.games.unwrap_or(config.simulation.games);
    let base_seed = options.base_seed.unwrap_or(config.simulation.base_seed);
    info!("Simulating {} games from seed {}", games, base_seed);

    let start = Instant::now();
    let summaries: Mutex<Vec<GameSummary>> = Mutex::new(Vec::with_capacity(games));
    let failures: Mutex<Vec<(u64, String)>> = Mutex::new(Vec::new());
    let logger = DebugLogger::disabled();

    (0..games as u64).into_par_iter().for_each(|offset| {
        let seed = base_seed + offset;
        match run_game(&config, seed, &logger) {
            Ok(summary) => summaries.lock().push(summary),
            Err(e) => failures.lock().push((seed, e)),
        }
        simple_profiler::merge_thread_local();
    });

    let mut summaries = summaries.into_inner();
    summaries.sort_by_key(|s| s.seed);
    let elapsed = start.elapsed();

    print_summary(&summaries, elapsed.as_millis());
    simple_profiler::print_report(elapsed.as_millis() as u64);

    let failures = failures.into_inner();
    if !failures.is_empty() {
        for (seed, e) in &failures {
            eprintln!("seed {}: {}", seed, e);
        }
        process::exit(1);
    }
}
