// Runs one headless game with the tail-chasing bot
//
// Usage:
//   tail-chaser [--seed <n>] [--config <path>]

use log::info;
use std::env;
use std::process;
use std::time::Instant;

use tail_chaser::config::Config;
use tail_chaser::debug_logger::DebugLogger;
use tail_chaser::game::run_game;
use tail_chaser::simple_profiler;

fn parse_args(args: &[String]) -> Result<(Option<u64>, Option<String>), String> {
    let mut seed = None;
    let mut config_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                let value = args.get(i + 1).ok_or("--seed requires an argument")?;
                seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|e| format!("Invalid seed '{}': {}", value, e))?,
                );
                i += 1;
            }
            "--config" => {
                let value = args.get(i + 1).ok_or("--config requires an argument")?;
                config_path = Some(value.clone());
                i += 1;
            }
            other => return Err(format!("Unknown option '{}'", other)),
        }
        i += 1;
    }

    Ok((seed, config_path))
}

#[tokio::main]
async fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let (seed, config_path) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: tail-chaser [--seed <n>] [--config <path>]");
            process::exit(1);
        }
    };

    let config = match config_path {
        Some(path) => Config::from_file(&path).unwrap_or_else(|e| {
            eprintln!("Error: could not load config from '{}': {}", path, e);
            process::exit(1);
        }),
        None => Config::load_or_default(),
    };
    let seed = seed.unwrap_or(config.game.seed);

    info!(
        "Starting game on a {}x{} grid with seed {}",
        config.game.rows, config.game.cols, seed
    );

    let logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
    let start = Instant::now();

    // The game loop is synchronous; the logger's writes run on the runtime's
    // other workers meanwhile
    let summary = tokio::task::block_in_place(|| run_game(&config, seed, &logger));
    logger.flush().await;

    simple_profiler::merge_thread_local();
    simple_profiler::print_report(start.elapsed().as_millis() as u64);

    match summary {
        Ok(summary) => {
            println!(
                "Result: {:?}  score: {}  length: {}  turns: {}",
                summary.result, summary.score, summary.length, summary.turns
            );
        }
        Err(e) => {
            eprintln!("Game aborted: {}", e);
            process::exit(1);
        }
    }
}
