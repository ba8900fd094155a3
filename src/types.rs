// Core value types shared by the grid, the distance fields and the search
// Cells are addressed by flat index `row * cols + col`

use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D coordinate on the grid, 0-indexed from the top-left corner
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Coord { row, col }
    }
}

/// Represents the four possible movement directions for the snake
///
/// Each direction is an (axis, sign) pair: axis 0 moves between rows,
/// axis 1 moves between columns, and the sign is the step along that axis.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all directions in neighbor scan order
    ///
    /// Horizontal moves come before vertical ones and the decreasing step
    /// before the increasing one. Every component that walks neighbors uses
    /// this order so tie-breaks are reproducible.
    pub fn all() -> [Direction; 4] {
        [Direction::Left, Direction::Right, Direction::Up, Direction::Down]
    }

    /// 0 for row movement, 1 for column movement
    pub fn axis(&self) -> usize {
        match self {
            Direction::Up | Direction::Down => 0,
            Direction::Left | Direction::Right => 1,
        }
    }

    pub fn sign(&self) -> i8 {
        match self {
            Direction::Up | Direction::Left => -1,
            Direction::Down | Direction::Right => 1,
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Builds a direction from its (axis, sign) encoding
    pub fn from_axis_sign(axis: usize, sign: i8) -> Option<Direction> {
        match (axis, sign) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (1, -1) => Some(Direction::Left),
            (1, 1) => Some(Direction::Right),
            _ => None,
        }
    }

    /// Converts direction to its lowercase name, as written to debug logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Parses a direction name, case-insensitively
    pub fn parse(s: &str) -> Result<Direction, String> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hop distance through free space, with a reserved unreachable value
///
/// `UNREACHABLE` orders above every finite distance and absorbs increments,
/// so comparisons and `succ` never need to special-case it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Distance(u32);

impl Distance {
    pub const ZERO: Distance = Distance(0);
    pub const UNREACHABLE: Distance = Distance(u32::MAX);

    pub fn new(hops: u32) -> Self {
        debug_assert!(hops != u32::MAX, "finite distance collides with sentinel");
        Distance(hops)
    }

    pub fn is_reachable(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn finite(&self) -> Option<u32> {
        if self.is_reachable() {
            Some(self.0)
        } else {
            None
        }
    }

    /// One more hop; unreachable stays unreachable
    pub fn succ(&self) -> Distance {
        if self.is_reachable() {
            Distance(self.0 + 1)
        } else {
            *self
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.finite() {
            Some(d) => write!(f, "{}", d),
            None => f.write_str("inf"),
        }
    }
}
