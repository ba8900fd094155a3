// Region analysis: which free-space components can the head reach after a move
//
// Runs on the body as it stands right after a hypothetical move. The tail cell
// counts as passable for this scan because it vacates on the next tick; any
// component that touches it is "tail-connected" and therefore not a dead end.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::grid::Grid;
use crate::simple_profiler::ProfileGuard;
use crate::snake::Snake;
use crate::union_find::UnionFind;

/// Components of free space around the head, keyed by representative cell
///
/// A representative is always one of the head's frontier (seed) cells.
#[derive(Debug, Clone)]
pub struct RegionAnalysis {
    /// Frontier cells next to the head with their component representative
    seeds: Vec<(usize, usize)>,
    sizes: HashMap<usize, usize>,
    tail_connected: BTreeSet<usize>,
    /// Every scanned cell with the seed index that first reached it
    visited: HashMap<usize, usize>,
    /// Seed index -> representative cell
    seed_reps: Vec<usize>,
}

impl RegionAnalysis {
    /// Flood-fills outward from every free neighbor of the head
    ///
    /// The neck is never a seed. A seed equal to the tail cell contributes no
    /// area but marks its partition as tail-connected.
    pub fn analyze(grid: &Grid, snake: &Snake) -> Self {
        let _guard = ProfileGuard::new("regions");

        let head = snake.head();
        let tail = snake.tail();
        let neck = snake.neck();
        let occupied = snake.occupied();

        let seeds: Vec<usize> = grid
            .neighbors(head, occupied, Some(tail))
            .filter(|&cell| Some(cell) != neck)
            .collect();

        let mut uf = UnionFind::new(seeds.len());
        let mut sizes = vec![0usize; seeds.len()];
        let mut touches_tail = vec![false; seeds.len()];
        let mut visited: HashMap<usize, usize> = HashMap::new();
        let mut queue = VecDeque::new();

        for (i, &cell) in seeds.iter().enumerate() {
            if cell == tail {
                touches_tail[i] = true;
                continue;
            }
            sizes[i] = 1;
            visited.insert(cell, i);
            queue.push_back(cell);
        }

        while let Some(cell) = queue.pop_front() {
            let i = visited[&cell];
            for next in grid.neighbors(cell, occupied, Some(tail)) {
                if next == tail {
                    touches_tail[i] = true;
                } else if let Some(&j) = visited.get(&next) {
                    uf.union(i, j);
                } else {
                    visited.insert(next, i);
                    sizes[i] += 1;
                    queue.push_back(next);
                }
            }
        }

        let seed_reps: Vec<usize> = (0..seeds.len()).map(|i| seeds[uf.find(i)]).collect();

        let mut component_sizes: HashMap<usize, usize> = HashMap::new();
        for (i, &size) in sizes.iter().enumerate() {
            *component_sizes.entry(seed_reps[i]).or_insert(0) += size;
        }
        let tail_connected: BTreeSet<usize> = (0..seeds.len())
            .filter(|&i| touches_tail[i])
            .map(|i| seed_reps[i])
            .collect();

        RegionAnalysis {
            seeds: seeds.iter().copied().zip(seed_reps.iter().copied()).collect(),
            sizes: component_sizes,
            tail_connected,
            visited,
            seed_reps,
        }
    }

    /// Frontier cells next to the head paired with their representative
    pub fn seeds(&self) -> &[(usize, usize)] {
        &self.seeds
    }

    /// Distinct component representatives
    pub fn representatives(&self) -> impl Iterator<Item = usize> + '_ {
        self.sizes.keys().copied()
    }

    pub fn component_size(&self, rep: usize) -> usize {
        self.sizes.get(&rep).copied().unwrap_or(0)
    }

    pub fn tail_connected(&self) -> &BTreeSet<usize> {
        &self.tail_connected
    }

    pub fn is_tail_connected(&self, rep: usize) -> bool {
        self.tail_connected.contains(&rep)
    }

    pub fn has_tail_access(&self) -> bool {
        !self.tail_connected.is_empty()
    }

    /// Component representative for any scanned cell or seed
    pub fn representative_of(&self, cell: usize) -> Option<usize> {
        if let Some(&i) = self.visited.get(&cell) {
            return Some(self.seed_reps[i]);
        }
        self.seeds
            .iter()
            .find(|(seed, _)| *seed == cell)
            .map(|&(_, rep)| rep)
    }

    /// Number of free cells reached by the scan (the tail is not counted)
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn visited_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.visited.keys().copied()
    }
}
