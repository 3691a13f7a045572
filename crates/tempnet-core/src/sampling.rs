//! Random non-edge sampling
//!
//! Two samplers with different cost profiles:
//!
//! - [`Graph::random_non_edge_exact`] counts free slots per node and walks
//!   to the drawn one. O(n) per draw regardless of density.
//! - [`Graph::random_non_edge_sparse`] draws pairs until it hits a non-edge.
//!   Expected `1 / (1 - density)` tries, so it degrades on dense graphs.
//!
//! [`Graph::random_non_edge`] picks between them by density.

use rand::Rng;

use crate::edge::Edge;
use crate::graph::Graph;

/// Density above which rejection sampling stops paying off
const SPARSE_DENSITY_LIMIT: f64 = 0.5;

impl Graph {
    /// Uniformly random non-edge, choosing the sampler by density
    pub fn random_non_edge<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Edge> {
        if self.density() < SPARSE_DENSITY_LIMIT {
            self.random_non_edge_sparse(rng)
        } else {
            self.random_non_edge_exact(rng)
        }
    }

    /// Uniformly random non-edge by walking the free slots of each node
    pub fn random_non_edge_exact<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Edge> {
        let non_edges = self.non_edges_count();
        if non_edges == 0 {
            return None;
        }
        // Undirected non-edges are seen from both endpoints
        let slots = if self.is_directed() { non_edges } else { 2 * non_edges };
        let mut r = rng.random_range(0..slots);
        let n = self.size();
        for i in self.nodes() {
            let free = (n - 1 - self.out_degree(i)) as u64;
            if r >= free {
                r -= free;
                continue;
            }
            for j in self.nodes() {
                if i != j && !self.succs(i).contains(j) {
                    if r == 0 {
                        return Some(self.edge(i, j));
                    }
                    r -= 1;
                }
            }
        }
        None
    }

    /// Uniformly random non-edge by rejection
    pub fn random_non_edge_sparse<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Edge> {
        if self.non_edges_count() == 0 {
            return None;
        }
        let n = self.size();
        loop {
            let i = rng.random_range(0..n);
            let j = rng.random_range(0..n);
            if i != j && !self.contains_edge(i, j) {
                return Some(self.edge(i, j));
            }
        }
    }
}
