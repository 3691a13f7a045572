//! Edges and lazy enumeration of node pairs

use std::fmt;

use crate::graph::Graph;

/// An edge between two nodes
///
/// Undirected edges are stored in canonical orientation (`i < j`), so two
/// `Edge` values naming the same undirected pair compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    i: usize,
    j: usize,
    directed: bool,
}

impl Edge {
    pub fn new(i: usize, j: usize, directed: bool) -> Self {
        if directed || i <= j {
            Self { i, j, directed }
        } else {
            Self { i: j, j: i, directed }
        }
    }

    pub fn i(&self) -> usize {
        self.i
    }

    pub fn j(&self) -> usize {
        self.j
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.directed {
            write!(f, "({}->{})", self.i, self.j)
        } else {
            write!(f, "({}-{})", self.i, self.j)
        }
    }
}

/// First pair of the enumeration over `n` nodes
pub(crate) fn first_pair(n: usize) -> Option<(usize, usize)> {
    if n >= 2 { Some((0, 1)) } else { None }
}

/// Pair following `(i, j)` in row-major order, skipping the diagonal.
///
/// Directed graphs enumerate every ordered pair; undirected graphs only the
/// pairs with `i < j`.
pub(crate) fn next_pair(n: usize, directed: bool, (i, j): (usize, usize)) -> Option<(usize, usize)> {
    let (mut i, mut j) = (i, j + 1);
    loop {
        if j >= n {
            i += 1;
            j = if directed { 0 } else { i + 1 };
        }
        if i >= n {
            return None;
        }
        if j >= n {
            continue;
        }
        if i != j {
            return Some((i, j));
        }
        j += 1;
    }
}

/// Which pairs a [`PossibleEdges`] cursor yields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PairFilter {
    /// Every pair of distinct nodes
    All,
    /// Only pairs that are not edges of the graph
    Missing,
}

/// Cursor over node pairs of a graph
///
/// Finite; restart by asking the graph for a new cursor.
pub struct PossibleEdges<'g> {
    graph: &'g Graph,
    cursor: Option<(usize, usize)>,
    filter: PairFilter,
}

impl<'g> PossibleEdges<'g> {
    pub(crate) fn new(graph: &'g Graph, filter: PairFilter) -> Self {
        Self {
            graph,
            cursor: first_pair(graph.size()),
            filter,
        }
    }
}

impl Iterator for PossibleEdges<'_> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        let n = self.graph.size();
        let directed = self.graph.is_directed();
        while let Some((i, j)) = self.cursor {
            self.cursor = next_pair(n, directed, (i, j));
            let keep = match self.filter {
                PairFilter::All => true,
                PairFilter::Missing => !self.graph.contains_edge(i, j),
            };
            if keep {
                return Some(Edge::new(i, j, directed));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_pairs(n: usize, directed: bool) -> Vec<(usize, usize)> {
        let mut res = Vec::new();
        let mut cursor = first_pair(n);
        while let Some(p) = cursor {
            res.push(p);
            cursor = next_pair(n, directed, p);
        }
        res
    }

    #[test]
    fn test_canonical_orientation() {
        assert_eq!(Edge::new(5, 2, false), Edge::new(2, 5, false));
        assert_ne!(Edge::new(5, 2, true), Edge::new(2, 5, true));
        assert_eq!(Edge::new(5, 2, false).i(), 2);
    }

    #[test]
    fn test_undirected_pairs() {
        assert_eq!(all_pairs(4, false), vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_directed_pairs() {
        let pairs = all_pairs(3, true);
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_cursor_filters() {
        let g = Graph::from_edges("g", 4, false, &[(0, 1), (2, 3)]);
        assert_eq!(g.possible_edges().count() as u64, g.possible_edges_count());
        let missing: Vec<Edge> = g.non_edges().collect();
        assert_eq!(missing.len() as u64, g.non_edges_count());
        assert!(missing.iter().all(|e| !g.contains_edge(e.i(), e.j())));
    }

    #[test]
    fn test_degenerate_sizes() {
        assert!(all_pairs(0, false).is_empty());
        assert!(all_pairs(1, true).is_empty());
        assert_eq!(all_pairs(2, false), vec![(0, 1)]);
    }
}
