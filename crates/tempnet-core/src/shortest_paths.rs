//! Hop-distance oracle over a static graph snapshot
//!
//! The oracle copies the successor lists at construction time, so later
//! edits to the source graph are not reflected. Rows of the distance matrix
//! are computed by BFS on demand and cached per source; the low-memory
//! variant answers a single query with an early-exit BFS and keeps nothing.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crate::graph::Graph;

/// Cached BFS distances
#[derive(Debug)]
pub struct ShortestPaths {
    succs: Vec<Vec<usize>>,
    rows: RefCell<HashMap<usize, Vec<Option<u32>>>>,
}

impl ShortestPaths {
    /// Snapshot the adjacency of `graph`
    pub fn construct(graph: &Graph) -> Self {
        let succs = graph.nodes().map(|i| graph.succs(i).sorted()).collect();
        Self {
            succs,
            rows: RefCell::new(HashMap::new()),
        }
    }

    pub fn size(&self) -> usize {
        self.succs.len()
    }

    /// Hop distance from `i` to `j`, `None` when unreachable
    pub fn distance(&self, i: usize, j: usize) -> Option<u32> {
        let mut rows = self.rows.borrow_mut();
        let row = rows.entry(i).or_insert_with(|| self.bfs(i, None));
        row[j]
    }

    /// Same as [`ShortestPaths::distance`] without caching anything
    pub fn low_memory_distance(&self, i: usize, j: usize) -> Option<u32> {
        if let Some(row) = self.rows.borrow().get(&i) {
            return row[j];
        }
        self.bfs(i, Some(j))[j]
    }

    /// Number of source rows currently cached
    pub fn cached_rows(&self) -> usize {
        self.rows.borrow().len()
    }

    fn bfs(&self, source: usize, target: Option<usize>) -> Vec<Option<u32>> {
        let mut dist = vec![None; self.succs.len()];
        dist[source] = Some(0);
        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            if Some(v) == target {
                break;
            }
            let next = dist[v].map(|d| d + 1);
            for &w in &self.succs[v] {
                if dist[w].is_none() {
                    dist[w] = next;
                    queue.push_back(w);
                }
            }
        }
        dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distances_on_path() {
        let g = Graph::from_edges("path", 5, false, &[(0, 1), (1, 2), (2, 3)]);
        let sp = ShortestPaths::construct(&g);
        assert_eq!(sp.distance(0, 0), Some(0));
        assert_eq!(sp.distance(0, 3), Some(3));
        assert_eq!(sp.distance(3, 0), Some(3));
        assert_eq!(sp.distance(0, 4), None);
        assert_eq!(sp.cached_rows(), 2);
    }

    #[test]
    fn test_low_memory_matches_and_caches_nothing() {
        let g = Graph::from_edges("d", 4, true, &[(0, 1), (1, 2), (2, 3), (3, 1)]);
        let sp = ShortestPaths::construct(&g);
        for i in 0..4 {
            for j in 0..4 {
                sp.low_memory_distance(i, j);
            }
            assert_eq!(sp.cached_rows(), i, "low-memory query must not cache");
            for j in 0..4 {
                assert_eq!(sp.low_memory_distance(i, j), sp.distance(i, j));
            }
        }
        assert_eq!(sp.distance(3, 0), None);
        assert_eq!(sp.distance(0, 3), Some(3));
    }
}
