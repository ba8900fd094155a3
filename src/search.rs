// Bounded-depth move search
//
// Each node scores its legal moves by the free space reachable afterwards,
// the food eaten along the path and how close the nearest remaining food is.
// Interior nodes recurse best-first and stop once a full-depth line is known
// to be at least as good as anything a weaker sibling could still produce.
// The snake is mutated in place on the way down and restored on the way up.

use log::debug;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use crate::distance::FoodFields;
use crate::grid::Grid;
use crate::regions::RegionAnalysis;
use crate::simple_profiler::ProfileGuard;
use crate::snake::Snake;
use crate::types::{Direction, Distance};

/// Closeness value used when no remaining food is reachable
pub const NO_FOOD_CLOSENESS: i64 = i64::MIN;

/// Lexicographic move score; larger is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score {
    /// Largest reachable component, plus food eaten on the path
    pub space: usize,
    pub food_eaten: usize,
    /// Remaining depth budget minus distance to the nearest food
    pub closeness: i64,
}

impl Score {
    pub const MIN: Score = Score {
        space: 0,
        food_eaten: 0,
        closeness: NO_FOOD_CLOSENESS,
    };
}

/// How far the best line found so far got
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Reached {
    Nothing,
    Depth(usize),
    /// Eating fills the grid; outranks any finite depth
    Win,
}

/// What the search concluded about the chosen move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The move eats the last food that fits: the grid is full afterwards
    Win,
    /// Best line reached `depth` with the given leaf score
    Searched {
        depth: usize,
        tail_connected: bool,
        score: Score,
    },
    /// No legal move existed; the snake continues straight into a collision
    NoEscape,
}

/// Move chosen by the search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub direction: Direction,
    /// Head cell after the move; `None` when a no-escape move leaves the grid
    pub cell: Option<usize>,
    pub outcome: Outcome,
}

impl Decision {
    pub fn is_no_escape(&self) -> bool {
        self.outcome == Outcome::NoEscape
    }

    pub fn is_win(&self) -> bool {
        self.outcome == Outcome::Win
    }
}

#[derive(Debug)]
struct Best {
    reached: Reached,
    tail_connected: bool,
    score: Score,
    choice: Option<(Direction, usize)>,
}

impl Best {
    /// True when a candidate does not improve on the current best
    fn dominates(&self, tail_connected: bool, reached: Reached, score: Score) -> bool {
        (tail_connected, reached, score) <= (self.tail_connected, self.reached, self.score)
    }

    fn record(&mut self, tail_connected: bool, reached: Reached, score: Score) {
        self.tail_connected = tail_connected;
        self.reached = reached;
        self.score = score;
    }
}

/// Whether the hypothetical move ate food or shifted the tail
enum Applied {
    Ate,
    Moved(Option<usize>),
}

type Candidates = BTreeMap<Score, Vec<(Direction, usize)>>;

/// One search over a borrowed snake, food fields and random source
pub struct MoveSearch<'a, R: Rng + ?Sized> {
    grid: &'a Grid,
    fields: &'a FoodFields,
    snake: &'a mut Snake,
    rng: &'a mut R,
    /// Foods not yet eaten on the current line
    remaining: BTreeSet<usize>,
    search_depth: usize,
    best: Best,
    nodes: usize,
}

impl<'a, R: Rng + ?Sized> MoveSearch<'a, R> {
    pub fn new(
        grid: &'a Grid,
        fields: &'a FoodFields,
        snake: &'a mut Snake,
        search_depth: usize,
        rng: &'a mut R,
    ) -> Self {
        MoveSearch {
            grid,
            fields,
            remaining: fields.cells().collect(),
            snake,
            rng,
            search_depth: search_depth.max(1),
            best: Best {
                reached: Reached::Nothing,
                tail_connected: false,
                score: Score::MIN,
                choice: None,
            },
            nodes: 0,
        }
    }

    /// Picks the next move for a snake currently travelling along `heading`
    ///
    /// The snake is restored to its original state before this returns.
    /// When no legal move exists the result keeps `heading` and is flagged
    /// `NoEscape`; detecting the resulting collision is left to the caller.
    pub fn run(mut self, heading: Direction) -> Decision {
        let _guard = ProfileGuard::new("search");
        let head = self.snake.head();

        let found = self.recur(heading, 1);
        let decision = match (found, self.best.choice) {
            (true, Some((direction, cell))) => Decision {
                direction,
                cell: Some(cell),
                outcome: match self.best.reached {
                    Reached::Win => Outcome::Win,
                    Reached::Depth(depth) => Outcome::Searched {
                        depth,
                        tail_connected: self.best.tail_connected,
                        score: self.best.score,
                    },
                    Reached::Nothing => Outcome::NoEscape,
                },
            },
            _ => Decision {
                direction: heading,
                cell: self.grid.step(head, heading),
                outcome: Outcome::NoEscape,
            },
        };

        debug!(
            "Search depth {}: {} nodes, chose {} -> {:?} ({:?})",
            self.search_depth, self.nodes, decision.direction, decision.cell, decision.outcome
        );
        decision
    }

    fn recur(&mut self, prev: Direction, depth: usize) -> bool {
        let _guard = ProfileGuard::new("search_node");
        self.nodes += 1;

        let moves: Vec<(Direction, usize)> = self
            .grid
            .legal_moves(
                self.snake.head(),
                Some(prev),
                self.snake.occupied(),
                Some(self.snake.tail()),
            )
            .collect();

        // Index 1 holds moves whose space reaches the tail
        let mut groups: [Candidates; 2] = [BTreeMap::new(), BTreeMap::new()];

        for (direction, cell) in moves {
            if self.remaining.contains(&cell)
                && self.snake.len() + self.remaining.len() == self.grid.len()
            {
                self.best.reached = Reached::Win;
                if depth == 1 {
                    self.best.choice = Some((direction, cell));
                }
                return true;
            }

            let applied = self.apply(cell);
            let (tail_connected, score) = self.score_position(depth);
            self.undo(cell, applied);

            if self.best.reached != Reached::Depth(self.search_depth)
                || !self.best.tail_connected
                || (tail_connected && score > self.best.score)
            {
                groups[tail_connected as usize]
                    .entry(score)
                    .or_default()
                    .push((direction, cell));
            }
        }

        if groups[0].is_empty() && groups[1].is_empty() {
            return false;
        }

        if depth == self.search_depth {
            return self.settle(&groups, depth);
        }

        let mut merged = groups[0].clone();
        for (score, moves) in &groups[1] {
            merged.entry(*score).or_default().extend(moves.iter().copied());
        }

        let mut improved = false;
        'scores: for (score, mut moves) in merged.into_iter().rev() {
            if self.best.reached >= Reached::Depth(self.search_depth)
                && self.best.tail_connected
                && score <= self.best.score
            {
                break;
            }
            moves.shuffle(&mut *self.rng);
            for (direction, cell) in moves {
                let applied = self.apply(cell);
                let found = self.recur(direction, depth + 1);
                self.undo(cell, applied);

                if !found {
                    continue;
                }
                improved = true;
                if depth == 1 {
                    self.best.choice = Some((direction, cell));
                }
                if self.best.reached == Reached::Win {
                    return true;
                }
                if self.best.tail_connected && score <= self.best.score {
                    break 'scores;
                }
            }
        }

        if improved {
            return true;
        }
        // No child line beat the best; this node may still be the deepest
        // point reached so far
        if Reached::Depth(depth) >= self.best.reached {
            return self.settle(&groups, depth);
        }
        false
    }

    /// Records this node's best move group as the best line if it improves it
    fn settle(&mut self, groups: &[Candidates; 2], depth: usize) -> bool {
        let tail_connected = !groups[1].is_empty();
        let Some((&score, moves)) = groups[tail_connected as usize].last_key_value() else {
            return false;
        };
        if self
            .best
            .dominates(tail_connected, Reached::Depth(depth), score)
        {
            return false;
        }
        self.best
            .record(tail_connected, Reached::Depth(depth), score);
        if depth == 1 {
            self.best.choice = moves.choose(&mut *self.rng).copied();
        }
        true
    }

    /// Scores the current (already moved) position
    fn score_position(&self, depth: usize) -> (bool, Score) {
        let regions = RegionAnalysis::analyze(self.grid, self.snake);
        let tail_connected = regions.has_tail_access();

        let mut best: Option<(usize, Reverse<Distance>)> = None;
        for &(seed, rep) in regions.seeds() {
            if tail_connected && !regions.is_tail_connected(rep) {
                continue;
            }
            let size = regions.component_size(rep);
            if best.is_some_and(|(top, _)| size < top) {
                continue;
            }
            let dist = self.fields.min_distance(seed, self.remaining.iter());
            let key = (size, Reverse(dist));
            if best.map_or(true, |current| key > current) {
                best = Some(key);
            }
        }

        let (space, dist) = best.unwrap_or((0, Reverse(Distance::UNREACHABLE)));
        let food_eaten = self.fields.len() - self.remaining.len();
        let budget = (self.search_depth - depth) as i64;
        let closeness = match dist.0.finite() {
            Some(d) => budget - i64::from(d),
            None => NO_FOOD_CLOSENESS,
        };

        (
            tail_connected,
            Score {
                space: space + food_eaten,
                food_eaten,
                closeness,
            },
        )
    }

    fn apply(&mut self, cell: usize) -> Applied {
        if self.remaining.remove(&cell) {
            self.snake.push_head(cell);
            Applied::Ate
        } else {
            let tail = self.snake.pop_tail();
            self.snake.push_head(cell);
            Applied::Moved(tail)
        }
    }

    fn undo(&mut self, cell: usize, applied: Applied) {
        self.snake.pop_head();
        match applied {
            Applied::Ate => {
                self.remaining.insert(cell);
            }
            Applied::Moved(Some(tail)) => self.snake.push_tail(tail),
            Applied::Moved(None) => {}
        }
    }
}

/// Convenience wrapper: one search from the snake's current state
pub fn find_move<R: Rng + ?Sized>(
    grid: &Grid,
    fields: &FoodFields,
    snake: &mut Snake,
    heading: Direction,
    search_depth: usize,
    rng: &mut R,
) -> Decision {
    MoveSearch::new(grid, fields, snake, search_depth, rng).run(heading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fields_for(grid: &Grid, snake: &Snake, foods: &[usize]) -> FoodFields {
        let mut fields = FoodFields::new();
        for &food in foods {
            fields.add_food(grid, food, snake.occupied());
        }
        fields
    }

    #[test]
    fn test_score_ordering_is_lexicographic() {
        let a = Score { space: 5, food_eaten: 0, closeness: -10 };
        let b = Score { space: 4, food_eaten: 3, closeness: 10 };
        let c = Score { space: 5, food_eaten: 0, closeness: NO_FOOD_CLOSENESS };
        assert!(a > b);
        assert!(a > c);
        assert!(Score::MIN <= c);
    }

    #[test]
    fn test_search_restores_snake() {
        let grid = Grid::new(4, 4);
        let mut snake = Snake::from_cells(&grid, [0, 1, 5, 6]).unwrap();
        let before = snake.clone();
        let fields = fields_for(&grid, &snake, &[15]);
        let mut rng = StdRng::seed_from_u64(3);
        find_move(&grid, &fields, &mut snake, Direction::Right, 4, &mut rng);
        assert_eq!(snake, before);
    }

    #[test]
    fn test_boxed_in_continues_straight() {
        // Single row filled by the snake, head against the right wall
        let grid = Grid::new(1, 3);
        let mut snake = Snake::from_cells(&grid, [0, 1, 2]).unwrap();
        let fields = FoodFields::new();
        let mut rng = StdRng::seed_from_u64(0);
        let decision = find_move(&grid, &fields, &mut snake, Direction::Right, 2, &mut rng);
        assert!(decision.is_no_escape());
        assert_eq!(decision.direction, Direction::Right);
        assert_eq!(decision.cell, None);
    }

    #[test]
    fn test_win_outranks_depth() {
        let grid = Grid::new(1, 4);
        let mut snake = Snake::from_cells(&grid, [0, 1, 2]).unwrap();
        let fields = fields_for(&grid, &snake, &[3]);
        let mut rng = StdRng::seed_from_u64(0);
        let decision = find_move(&grid, &fields, &mut snake, Direction::Right, 2, &mut rng);
        assert!(decision.is_win());
        assert_eq!(decision.direction, Direction::Right);
        assert_eq!(decision.cell, Some(3));
    }
}
