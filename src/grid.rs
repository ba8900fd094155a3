// Grid index utilities: flat index <-> coordinate conversion and neighbor scans

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::{Coord, Direction};

/// Immutable rectangular grid dimensions
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        debug_assert!(rows > 0 && cols > 0, "grid must have at least one cell");
        Grid { rows, cols }
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self, coord: Coord) -> usize {
        debug_assert!(self.contains(coord));
        coord.row * self.cols + coord.col
    }

    pub fn coord(&self, cell: usize) -> Coord {
        debug_assert!(cell < self.len());
        Coord {
            row: cell / self.cols,
            col: cell % self.cols,
        }
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// Cell reached by one step in `direction`, or `None` at the edge
    pub fn step(&self, cell: usize, direction: Direction) -> Option<usize> {
        let Coord { row, col } = self.coord(cell);
        match direction {
            Direction::Up if row > 0 => Some(cell - self.cols),
            Direction::Down if row + 1 < self.rows => Some(cell + self.cols),
            Direction::Left if col > 0 => Some(cell - 1),
            Direction::Right if col + 1 < self.cols => Some(cell + 1),
            _ => None,
        }
    }

    /// Orthogonal in-bounds neighbors of `cell` that are not occupied
    ///
    /// `allow` is treated as free even when it is in `occupied`; the search
    /// uses it for the tail cell, which vacates on the same tick.
    pub fn neighbors<'a>(
        &'a self,
        cell: usize,
        occupied: &'a HashSet<usize>,
        allow: Option<usize>,
    ) -> impl Iterator<Item = usize> + Clone + 'a {
        self.legal_moves(cell, None, occupied, allow)
            .map(|(_, next)| next)
    }

    /// Like `neighbors`, but yields `(direction, cell)` pairs and never
    /// reverses `heading`
    pub fn legal_moves<'a>(
        &'a self,
        head: usize,
        heading: Option<Direction>,
        occupied: &'a HashSet<usize>,
        allow: Option<usize>,
    ) -> impl Iterator<Item = (Direction, usize)> + Clone + 'a {
        let reverse = heading.map(|h| h.opposite());
        Direction::all().into_iter().filter_map(move |dir| {
            if Some(dir) == reverse {
                return None;
            }
            let next = self.step(head, dir)?;
            if Some(next) == allow || !occupied.contains(&next) {
                Some((dir, next))
            } else {
                None
            }
        })
    }

    /// Direction that moves `from` onto the adjacent cell `to`
    pub fn direction_between(&self, from: usize, to: usize) -> Option<Direction> {
        Direction::all()
            .into_iter()
            .find(|&dir| self.step(from, dir) == Some(to))
    }

    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.direction_between(a, b).is_some()
    }
}
