// Snake body: ordered cells (tail first, head last) plus an occupancy set

use std::collections::{HashSet, VecDeque};

use crate::grid::Grid;

/// Snake body with O(1) membership
///
/// The search mutates one `Snake` in place and undoes every change before
/// returning, so the push/pop pairs here must stay exact inverses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<usize>,
    occupied: HashSet<usize>,
}

impl Snake {
    /// Builds a snake from cells ordered tail to head
    ///
    /// # Returns
    /// * `Err` if the body is empty, leaves the grid, repeats a cell or is not
    ///   a chain of adjacent cells
    pub fn from_cells<I>(grid: &Grid, cells: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = usize>,
    {
        let body: VecDeque<usize> = cells.into_iter().collect();
        if body.is_empty() {
            return Err("Snake body must contain at least one cell".to_string());
        }
        if let Some(&cell) = body.iter().find(|&&c| c >= grid.len()) {
            return Err(format!(
                "Snake cell {} is outside the {}x{} grid",
                cell, grid.rows, grid.cols
            ));
        }
        let occupied: HashSet<usize> = body.iter().copied().collect();
        if occupied.len() != body.len() {
            return Err("Snake body visits the same cell twice".to_string());
        }
        for (a, b) in body.iter().zip(body.iter().skip(1)) {
            if !grid.are_adjacent(*a, *b) {
                return Err(format!("Snake cells {} and {} are not adjacent", a, b));
            }
        }
        Ok(Snake { body, occupied })
    }

    pub fn single(cell: usize) -> Self {
        Snake {
            body: VecDeque::from([cell]),
            occupied: HashSet::from([cell]),
        }
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn head(&self) -> usize {
        self.body[self.body.len() - 1]
    }

    pub fn tail(&self) -> usize {
        self.body[0]
    }

    /// Cell behind the head, if the snake is longer than one cell
    pub fn neck(&self) -> Option<usize> {
        self.body.len().checked_sub(2).map(|i| self.body[i])
    }

    pub fn contains(&self, cell: usize) -> bool {
        self.occupied.contains(&cell)
    }

    pub fn occupied(&self) -> &HashSet<usize> {
        &self.occupied
    }

    pub fn body(&self) -> &VecDeque<usize> {
        &self.body
    }

    /// Cells from tail to head
    pub fn cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.body.iter().copied()
    }

    pub fn push_head(&mut self, cell: usize) {
        let fresh = self.occupied.insert(cell);
        debug_assert!(fresh, "head moved onto occupied cell {}", cell);
        self.body.push_back(cell);
    }

    pub fn pop_head(&mut self) -> Option<usize> {
        let cell = self.body.pop_back()?;
        self.occupied.remove(&cell);
        Some(cell)
    }

    pub fn pop_tail(&mut self) -> Option<usize> {
        let cell = self.body.pop_front()?;
        self.occupied.remove(&cell);
        Some(cell)
    }

    pub fn push_tail(&mut self, cell: usize) {
        let fresh = self.occupied.insert(cell);
        debug_assert!(fresh, "tail restored onto occupied cell {}", cell);
        self.body.push_front(cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cells_validates_path() {
        let grid = Grid::new(3, 3);
        assert!(Snake::from_cells(&grid, [0, 1, 2, 5]).is_ok());
        assert!(Snake::from_cells(&grid, Vec::new()).is_err());
        assert!(Snake::from_cells(&grid, [0, 2]).is_err());
        assert!(Snake::from_cells(&grid, [0, 1, 0]).is_err());
        assert!(Snake::from_cells(&grid, [8, 9]).is_err());
        // 2 -> 3 wraps a row, which is not adjacency
        assert!(Snake::from_cells(&grid, [2, 3]).is_err());
    }

    #[test]
    fn test_push_pop_round_trip_restores_state() {
        let grid = Grid::new(3, 3);
        let original = Snake::from_cells(&grid, [0, 1, 4]).unwrap();
        let mut snake = original.clone();

        let tail = snake.pop_tail().unwrap();
        snake.push_head(7);
        assert_eq!(snake.head(), 7);
        assert_eq!(snake.tail(), 1);
        assert!(!snake.contains(0));

        snake.pop_head();
        snake.push_tail(tail);
        assert_eq!(snake, original);
    }

    #[test]
    fn test_neck() {
        let grid = Grid::new(2, 2);
        assert_eq!(Snake::single(0).neck(), None);
        assert_eq!(Snake::from_cells(&grid, [0, 1, 3]).unwrap().neck(), Some(1));
    }
}
