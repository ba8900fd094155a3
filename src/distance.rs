// Per-food BFS distance fields with incremental repair
//
// Every active food owns a full-grid array of hop distances through free
// space. Fields are built once when the food appears and then repaired
// locally after each snake move instead of being recomputed.

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::grid::Grid;
use crate::simple_profiler::ProfileGuard;
use crate::types::Distance;

/// Shortest obstacle-aware distance from one food cell to every cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceField {
    food: usize,
    dist: Vec<Distance>,
}

impl DistanceField {
    /// Level-order BFS from `food` over cells not in `occupied`
    pub fn build(grid: &Grid, food: usize, occupied: &HashSet<usize>) -> Self {
        let _guard = ProfileGuard::new("field_build");

        let mut dist = vec![Distance::UNREACHABLE; grid.len()];
        dist[food] = Distance::ZERO;
        let mut queue = VecDeque::from([food]);

        while let Some(cell) = queue.pop_front() {
            let next_dist = dist[cell].succ();
            for next in grid.neighbors(cell, occupied, None) {
                if dist[next] <= next_dist {
                    continue;
                }
                dist[next] = next_dist;
                queue.push_back(next);
            }
        }

        DistanceField { food, dist }
    }

    /// Repairs the field after the snake moved
    ///
    /// `occupied` must already reflect the move: `added` (the new head) is in
    /// it and `removed` (the vacated tail, if any) is not.
    ///
    /// Phase 1 invalidates every cell whose distance may have depended on
    /// `added`, collecting the still-valid boundary. Phase 2 relaxes outward
    /// from that boundary and from the freed tail cell.
    pub fn update(
        &mut self,
        grid: &Grid,
        occupied: &HashSet<usize>,
        added: usize,
        removed: Option<usize>,
    ) {
        let _guard = ProfileGuard::new("field_update");

        let mut invalidate = VecDeque::from([(added, self.dist[added])]);
        self.dist[added] = Distance::UNREACHABLE;
        let mut repair = VecDeque::new();

        while let Some((cell, old)) = invalidate.pop_front() {
            for next in grid.neighbors(cell, occupied, None) {
                let d = self.dist[next];
                if !d.is_reachable() {
                    continue;
                }
                if d == old.succ() {
                    invalidate.push_back((next, d));
                    self.dist[next] = Distance::UNREACHABLE;
                } else if d <= old {
                    repair.push_back(next);
                }
            }
        }

        // Chasing the tail re-occupies the freed cell in the same tick
        if let Some(freed) = removed.filter(|cell| !occupied.contains(cell)) {
            let best = grid
                .neighbors(freed, occupied, None)
                .map(|next| self.dist[next])
                .min()
                .unwrap_or(Distance::UNREACHABLE);
            if best.is_reachable() {
                self.dist[freed] = best.succ();
                repair.push_back(freed);
            }
        }

        while let Some(cell) = repair.pop_front() {
            let next_dist = self.dist[cell].succ();
            for next in grid.neighbors(cell, occupied, None) {
                if self.dist[next] <= next_dist {
                    continue;
                }
                self.dist[next] = next_dist;
                repair.push_back(next);
            }
        }
    }

    pub fn food(&self) -> usize {
        self.food
    }

    pub fn get(&self, cell: usize) -> Distance {
        self.dist[cell]
    }

    pub fn as_slice(&self) -> &[Distance] {
        &self.dist
    }
}

/// The set of active foods, each with its maintained distance field
#[derive(Debug, Clone, Default)]
pub struct FoodFields {
    fields: BTreeMap<usize, DistanceField>,
    verify: bool,
}

impl FoodFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields that re-check every incremental repair against a full rebuild
    /// in debug builds
    pub fn verified() -> Self {
        FoodFields {
            fields: BTreeMap::new(),
            verify: true,
        }
    }

    /// Registers `food` and builds its field from scratch
    pub fn add_food(&mut self, grid: &Grid, food: usize, occupied: &HashSet<usize>) {
        debug_assert!(!occupied.contains(&food), "food {} placed on the snake", food);
        self.fields
            .insert(food, DistanceField::build(grid, food, occupied));
    }

    pub fn remove_food(&mut self, food: usize) -> Option<DistanceField> {
        self.fields.remove(&food)
    }

    /// Repairs every field after one snake move
    pub fn update_all(
        &mut self,
        grid: &Grid,
        occupied: &HashSet<usize>,
        added: usize,
        removed: Option<usize>,
    ) {
        for field in self.fields.values_mut() {
            field.update(grid, occupied, added, removed);
            if cfg!(debug_assertions) && self.verify {
                let rebuilt = DistanceField::build(grid, field.food, occupied);
                debug_assert_eq!(
                    field.as_slice(),
                    rebuilt.as_slice(),
                    "distance field for food {} drifted from a full rebuild",
                    field.food
                );
            }
        }
    }

    /// Smallest distance from `cell` to any of `foods`
    pub fn min_distance<'a, I>(&self, cell: usize, foods: I) -> Distance
    where
        I: IntoIterator<Item = &'a usize>,
    {
        foods
            .into_iter()
            .filter_map(|food| self.fields.get(food))
            .map(|field| field.get(cell))
            .min()
            .unwrap_or(Distance::UNREACHABLE)
    }

    pub fn get(&self, food: usize) -> Option<&DistanceField> {
        self.fields.get(&food)
    }

    pub fn contains(&self, food: usize) -> bool {
        self.fields.contains_key(&food)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Active food cells in ascending order
    pub fn cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.fields.keys().copied()
    }
}
