//! Disjoint-set forest used to merge flood-fill partitions into regions.
//!
//! `find` compresses the whole path to the root; `union` links by rank and,
//! when ranks tie, keeps the root of the first argument and bumps its rank.

#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
}

impl UnionFind {
    /// Creates `n` singleton sets over `0..n`
    pub fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
            rank: vec![1; n],
        }
    }

    /// Returns the representative of the set containing `x`
    ///
    /// Out-of-range `x` is a caller bug and panics on the index.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merges the sets containing `a` and `b`
    pub fn union(&mut self, a: usize, b: usize) {
        let mut keep = self.find(a);
        let mut absorb = self.find(b);
        if keep == absorb {
            return;
        }
        match self.rank[keep].cmp(&self.rank[absorb]) {
            std::cmp::Ordering::Less => std::mem::swap(&mut keep, &mut absorb),
            std::cmp::Ordering::Equal => self.rank[keep] += 1,
            std::cmp::Ordering::Greater => {}
        }
        self.parent[absorb] = keep;
    }

    pub fn same_set(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}
