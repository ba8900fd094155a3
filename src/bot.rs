// Bot session: owns the body, the per-food distance fields and the heading,
// and turns one host tick into a search plus an incremental state update.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SearchConfig;
use crate::distance::FoodFields;
use crate::grid::Grid;
use crate::search::{Decision, MoveSearch};
use crate::snake::Snake;
use crate::types::Direction;

/// Stateful tail-chasing bot
///
/// Not reentrant: each `step` runs the search and applies the chosen move
/// before returning.
pub struct Bot<R: Rng = StdRng> {
    config: SearchConfig,
    grid: Grid,
    snake: Snake,
    fields: FoodFields,
    heading: Direction,
    rng: R,
    turn: u64,
}

impl Bot<StdRng> {
    /// Creates a bot with a seeded random source for tie-breaking
    ///
    /// # Arguments
    /// * `grid` - Arena dimensions
    /// * `head` - Current head cell
    /// * `heading` - Direction the snake last moved in
    /// * `foods` - Food cells already on the board
    /// * `body` - Optional body ordered tail to head; must end at `head`.
    ///   A missing body means a one-cell snake.
    /// * `config` - Search settings
    /// * `seed` - Seed for the tie-break random source
    pub fn new(
        grid: Grid,
        head: usize,
        heading: Direction,
        foods: &[usize],
        body: Option<&[usize]>,
        config: SearchConfig,
        seed: u64,
    ) -> Result<Self, String> {
        Self::with_rng(
            grid,
            head,
            heading,
            foods,
            body,
            config,
            StdRng::seed_from_u64(seed),
        )
    }
}

impl<R: Rng> Bot<R> {
    /// Like `new`, with a caller-supplied random source
    pub fn with_rng(
        grid: Grid,
        head: usize,
        heading: Direction,
        foods: &[usize],
        body: Option<&[usize]>,
        config: SearchConfig,
        rng: R,
    ) -> Result<Self, String> {
        let snake = match body {
            Some(cells) => {
                if cells.last() != Some(&head) {
                    return Err(format!(
                        "Body must end at the head cell {}, got {:?}",
                        head,
                        cells.last()
                    ));
                }
                Snake::from_cells(&grid, cells.iter().copied())?
            }
            None => Snake::from_cells(&grid, [head])?,
        };

        let fields = if config.verify_incremental_fields {
            FoodFields::verified()
        } else {
            FoodFields::new()
        };

        let mut bot = Bot {
            config,
            grid,
            snake,
            fields,
            heading,
            rng,
            turn: 0,
        };
        for &food in foods {
            bot.add_food(food)?;
        }
        Ok(bot)
    }

    /// Registers a food cell and builds its distance field
    pub fn add_food(&mut self, food: usize) -> Result<(), String> {
        if food >= self.grid.len() {
            return Err(format!(
                "Food cell {} is outside the {}x{} grid",
                food, self.grid.rows, self.grid.cols
            ));
        }
        if self.snake.contains(food) {
            return Err(format!("Food cell {} is on the snake", food));
        }
        if self.fields.contains(food) {
            return Err(format!("Food cell {} is already registered", food));
        }
        self.fields.add_food(&self.grid, food, self.snake.occupied());
        Ok(())
    }

    /// Discards a food and its field; returns whether it was present
    pub fn remove_food(&mut self, food: usize) -> bool {
        self.fields.remove_food(food).is_some()
    }

    /// Free cells: neither body nor food
    pub fn free_cells(&self) -> usize {
        self.grid.len() - self.snake.len() - self.fields.len()
    }

    /// Depth actually searched for a requested depth in the current position
    pub fn effective_depth(&self, requested: usize) -> usize {
        self.config.effective_depth(requested, self.free_cells())
    }

    /// Runs the search without moving the snake
    ///
    /// Body, heading, fields and turn count are left as they were. Tie-breaks
    /// draw from the bot's random source, so a later `step` sees a different
    /// random stream than it would without this call.
    pub fn find_move(&mut self, search_depth: usize) -> Decision {
        MoveSearch::new(
            &self.grid,
            &self.fields,
            &mut self.snake,
            search_depth,
            &mut self.rng,
        )
        .run(self.heading)
    }

    /// Per-tick entry point: optionally add a food, search, apply the move
    ///
    /// # Returns
    /// * The direction the snake moves in this tick
    pub fn step(&mut self, new_food: Option<usize>, search_depth: usize) -> Result<Direction, String> {
        self.step_decision(new_food, search_depth)
            .map(|decision| decision.direction)
    }

    /// Same as `step`, returning the full search decision
    pub fn step_decision(
        &mut self,
        new_food: Option<usize>,
        search_depth: usize,
    ) -> Result<Decision, String> {
        if let Some(food) = new_food {
            self.add_food(food)?;
        }

        let depth = self.effective_depth(search_depth);
        if depth != search_depth {
            debug!(
                "Turn {}: {} free cells left, searching to depth {}",
                self.turn,
                self.free_cells(),
                depth
            );
        }

        let decision = self.find_move(depth);
        self.apply(&decision);
        self.turn += 1;
        Ok(decision)
    }

    fn apply(&mut self, decision: &Decision) {
        self.heading = decision.direction;

        let cell = match decision.cell {
            Some(cell) if !decision.is_no_escape() => cell,
            _ => {
                warn!(
                    "Turn {}: no legal move from {}, continuing {}",
                    self.turn,
                    self.snake.head(),
                    decision.direction
                );
                return;
            }
        };

        let removed = if self.fields.remove_food(cell).is_some() {
            info!(
                "Turn {}: ate food at {}, length {}",
                self.turn,
                cell,
                self.snake.len() + 1
            );
            None
        } else {
            self.snake.pop_tail()
        };
        self.snake.push_head(cell);
        self.fields
            .update_all(&self.grid, self.snake.occupied(), cell, removed);
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn fields(&self) -> &FoodFields {
        &self.fields
    }

    /// Active food cells in ascending order
    pub fn foods(&self) -> Vec<usize> {
        self.fields.cells().collect()
    }

    /// Ticks applied so far
    pub fn turn(&self) -> u64 {
        self.turn
    }
}
