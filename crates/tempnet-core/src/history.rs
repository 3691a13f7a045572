//! Reversible edit records for [`Graph`]

use crate::edge::Edge;
use crate::graph::Graph;
use crate::listener::GraphChange;

/// A single recorded edge mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Change {
    Addition { i: usize, j: usize },
    Removal { i: usize, j: usize },
}

impl Change {
    pub fn edge(&self, directed: bool) -> Edge {
        match *self {
            Change::Addition { i, j } | Change::Removal { i, j } => Edge::new(i, j, directed),
        }
    }
}

/// Undo `change` through the low-level primitives, bypassing history.
///
/// Returns the notification describing the undo; the caller decides whether
/// to fire it (a full rollback fires a single reset instead).
pub(crate) fn revert(change: Change, graph: &mut Graph) -> GraphChange {
    let directed = graph.is_directed();
    match change {
        Change::Addition { i, j } => {
            graph.perform_remove_edge(i, j);
            GraphChange::Removed(Edge::new(i, j, directed))
        }
        Change::Removal { i, j } => {
            graph.perform_add_edge(i, j);
            GraphChange::Added(Edge::new(i, j, directed))
        }
    }
}
