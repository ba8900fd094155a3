// Headless game host
//
// Owns the authoritative board: spawns food, applies moves and detects
// collisions. A `Bot` plays against it through `run_game`, which is what the
// binaries and the simulation tests drive.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::bot::Bot;
use crate::config::Config;
use crate::debug_logger::{timestamp_now, DebugLogger, LogEntry};
use crate::grid::Grid;
use crate::snake::Snake;
use crate::types::{Coord, Direction};

/// How a single tick resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Moved,
    /// Ate `food`; `spawned` is its replacement
    Ate { food: usize, spawned: usize },
    /// Ate the last food that fit: no free cell is left for a new one
    Won,
    HitWall,
    HitBody,
}

impl TickOutcome {
    pub fn is_game_over(&self) -> bool {
        matches!(self, TickOutcome::Won | TickOutcome::HitWall | TickOutcome::HitBody)
    }
}

/// Final state of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Won,
    HitWall,
    HitBody,
    /// Reached the configured turn limit
    TurnLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub seed: u64,
    pub score: usize,
    pub turns: u64,
    pub length: usize,
    pub result: GameResult,
}

/// Board state owned by the host
pub struct Game {
    grid: Grid,
    snake: Snake,
    foods: BTreeSet<usize>,
    heading: Direction,
    rng: StdRng,
    score: usize,
    turns: u64,
}

impl Game {
    /// Starts a game: head at the grid centre heading down, foods placed at
    /// random free cells
    pub fn new(config: &Config, seed: u64) -> Result<Self, String> {
        config.validate()?;
        let grid = Grid::new(config.game.rows, config.game.cols);
        let head = grid.index(Coord::new(grid.rows / 2, grid.cols / 2));

        let mut game = Game {
            grid,
            snake: Snake::single(head),
            foods: BTreeSet::new(),
            heading: Direction::Down,
            rng: StdRng::seed_from_u64(seed),
            score: 0,
            turns: 0,
        };
        for _ in 0..config.game.food_count {
            game.spawn_food()
                .ok_or_else(|| "No free cell left for initial food".to_string())?;
        }
        Ok(game)
    }

    /// Places one food on a uniformly random free cell
    fn spawn_food(&mut self) -> Option<usize> {
        let cell = (0..self.grid.len())
            .filter(|c| !self.snake.contains(*c) && !self.foods.contains(c))
            .choose(&mut self.rng)?;
        self.foods.insert(cell);
        Some(cell)
    }

    /// Moves the head one cell along `direction`
    ///
    /// The tail vacates before the collision check unless the move eats,
    /// so following the tail closely is legal.
    pub fn tick(&mut self, direction: Direction) -> TickOutcome {
        self.turns += 1;
        self.heading = direction;

        let Some(next) = self.grid.step(self.snake.head(), direction) else {
            return TickOutcome::HitWall;
        };

        let eats = self.foods.contains(&next);
        let vacates = !eats && next == self.snake.tail();
        if self.snake.contains(next) && !vacates {
            return TickOutcome::HitBody;
        }
        if eats {
            self.foods.remove(&next);
        } else {
            self.snake.pop_tail();
        }
        self.snake.push_head(next);

        if !eats {
            return TickOutcome::Moved;
        }
        self.score += 1;
        match self.spawn_food() {
            Some(spawned) => TickOutcome::Ate {
                food: next,
                spawned,
            },
            None => TickOutcome::Won,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn foods(&self) -> &BTreeSet<usize> {
        &self.foods
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn turns(&self) -> u64 {
        self.turns
    }
}

/// Plays one full game between a fresh `Bot` and the host
///
/// The bot's tie-break source is seeded from `seed` as well, so a summary
/// is reproducible from its seed and the configuration.
pub fn run_game(config: &Config, seed: u64, logger: &DebugLogger) -> Result<GameSummary, String> {
    let mut game = Game::new(config, seed)?;
    let foods: Vec<usize> = game.foods().iter().copied().collect();
    let mut bot = Bot::new(
        *game.grid(),
        game.snake().head(),
        game.heading(),
        &foods,
        None,
        config.search.clone(),
        seed,
    )?;

    let depth = config.game.host_search_depth;
    let mut new_food = None;
    let mut result = GameResult::TurnLimit;

    while game.turns() < config.game.max_turns as u64 {
        let pre_body: Vec<usize> = bot.snake().cells().collect();
        let pre_heading = bot.heading();
        let pre_foods = bot.foods();
        let turn = game.turns();

        let direction = bot.step(new_food, depth)?;

        if logger.is_enabled() {
            logger.log_move(LogEntry {
                turn,
                chosen_move: direction,
                grid: *game.grid(),
                body: pre_body,
                heading: pre_heading,
                foods: pre_foods,
                new_food,
                search_depth: depth,
                timestamp: timestamp_now(),
            });
        }

        new_food = None;
        match game.tick(direction) {
            TickOutcome::Moved => {}
            TickOutcome::Ate { food, spawned } => {
                debug!("Turn {}: ate {}, spawned {}", turn, food, spawned);
                new_food = Some(spawned);
            }
            TickOutcome::Won => {
                result = GameResult::Won;
                break;
            }
            TickOutcome::HitWall => {
                result = GameResult::HitWall;
                break;
            }
            TickOutcome::HitBody => {
                result = GameResult::HitBody;
                break;
            }
        }
        debug_assert_eq!(bot.snake(), game.snake(), "bot and host disagree on the body");
    }

    let summary = GameSummary {
        seed,
        score: game.score(),
        turns: game.turns(),
        length: game.snake().len(),
        result,
    };
    info!(
        "Game {} finished: {:?} after {} turns, score {}, length {}",
        seed, summary.result, summary.turns, summary.score, summary.length
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(rows: usize, cols: usize) -> Config {
        let mut config = Config::default_hardcoded();
        config.game.rows = rows;
        config.game.cols = cols;
        config
    }

    #[test]
    fn test_new_game_layout() {
        let config = Config::default_hardcoded();
        let game = Game::new(&config, 42).unwrap();
        assert_eq!(game.snake().len(), 1);
        assert_eq!(game.grid().coord(game.snake().head()), Coord::new(7, 8));
        assert_eq!(game.heading(), Direction::Down);
        assert_eq!(game.foods().len(), 1);
        assert!(!game.snake().contains(*game.foods().iter().next().unwrap()));
    }

    #[test]
    fn test_same_seed_same_food() {
        let config = Config::default_hardcoded();
        let a = Game::new(&config, 9).unwrap();
        let b = Game::new(&config, 9).unwrap();
        assert_eq!(a.foods(), b.foods());
    }

    #[test]
    fn test_wall_ends_game() {
        let config = small_config(1, 2);
        let mut game = Game::new(&config, 0).unwrap();
        // Head starts at column 1 of a single row
        assert_eq!(game.tick(Direction::Down), TickOutcome::HitWall);
        assert!(TickOutcome::HitWall.is_game_over());
    }

    #[test]
    fn test_eating_the_last_food_wins() {
        // 1x2: head in column 1, the only food must be column 0
        let config = small_config(1, 2);
        let mut game = Game::new(&config, 3).unwrap();
        assert_eq!(game.foods().iter().copied().collect::<Vec<_>>(), vec![0]);
        assert_eq!(game.tick(Direction::Left), TickOutcome::Won);
        assert_eq!(game.score(), 1);
        assert_eq!(game.snake().len(), 2);
    }

    #[test]
    fn test_eating_spawns_replacement() {
        let config = small_config(1, 4);
        let mut game = Game::new(&config, 1).unwrap();
        let food = *game.foods().iter().next().unwrap();
        let head = game.snake().head();
        let direction = if food < head { Direction::Left } else { Direction::Right };

        let mut outcome = TickOutcome::Moved;
        while outcome == TickOutcome::Moved {
            outcome = game.tick(direction);
        }
        match outcome {
            TickOutcome::Ate { food: eaten, spawned } => {
                assert_eq!(eaten, food);
                assert!(!game.snake().contains(spawned));
                assert_eq!(game.snake().len(), 2);
            }
            other => panic!("expected to eat, got {:?}", other),
        }
    }

    #[test]
    fn test_body_hit_leaves_board_intact() {
        let config = small_config(3, 3);
        let mut game = Game::new(&config, 0).unwrap();
        game.snake = Snake::from_cells(&game.grid, [1, 4, 3]).unwrap();
        game.foods = BTreeSet::from([8]);
        // Turning right from 3 runs into the neck at 4
        assert_eq!(game.tick(Direction::Right), TickOutcome::HitBody);
        assert_eq!(game.snake().cells().collect::<Vec<_>>(), vec![1, 4, 3]);
    }

    #[test]
    fn test_following_the_tail_is_legal() {
        let config = small_config(2, 2);
        let mut game = Game::new(&config, 0).unwrap();
        // Ring filling the grid: head at 3, tail at 1 directly above it
        game.snake = Snake::from_cells(&game.grid, [1, 0, 2, 3]).unwrap();
        game.foods = BTreeSet::new();
        assert_eq!(game.tick(Direction::Up), TickOutcome::Moved);
        assert_eq!(game.snake().cells().collect::<Vec<_>>(), vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_bot_plays_small_game() {
        let mut config = small_config(4, 4);
        config.search.endgame_depth = 6;
        config.game.max_turns = 2_000;
        let summary = run_game(&config, 5, &DebugLogger::disabled()).unwrap();
        assert_eq!(summary.seed, 5);
        assert_eq!(summary.length, summary.score + 1);
        assert!(summary.turns > 0);
    }
}
