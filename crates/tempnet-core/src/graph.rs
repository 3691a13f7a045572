//! Mutable graphs over a fixed node set
//!
//! A [`Graph`] stores one [`Coalition`] of successors per node and, for
//! directed graphs, one of predecessors. Undirected graphs keep their
//! successor sets symmetric and have no separate predecessor storage.
//!
//! Mutations that would create a self-loop, duplicate an edge or remove a
//! missing one are rejected by returning `false`; generators rely on being
//! able to attempt edges freely.
//!
//! ## History
//!
//! Between [`Graph::start_recording_history`] and
//! [`Graph::stop_recording_history`], every successful mutation pushes a
//! reversible record. [`Graph::revert_changes`] undoes the most recent
//! records one by one, [`Graph::reset_graph`] undoes all of them and fires
//! a single [`GraphChange::Reset`].
//!
//! ## Shortest paths
//!
//! [`Graph::shortest_paths`] builds a BFS distance oracle on first use and
//! caches it. The cache is a snapshot: it is *not* invalidated when the
//! graph changes. Call [`Graph::reset_shortest_paths`] after editing.

use std::borrow::Cow;
use std::cell::OnceCell;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use crate::coalition::Coalition;
use crate::edge::{Edge, PairFilter, PossibleEdges};
use crate::error::{GraphError, GraphResult};
use crate::history::{self, Change};
use crate::listener::{GraphChange, GraphListener, ListenerSet};
use crate::shortest_paths::ShortestPaths;

/// A directed or undirected graph with optional edit history
pub struct Graph {
    name: String,
    n: usize,
    m: usize,
    directed: bool,
    succs: Vec<Coalition>,
    /// Present only for directed graphs
    preds: Option<Vec<Coalition>>,
    history: Option<Vec<Change>>,
    shortest_paths: OnceCell<ShortestPaths>,
    listeners: ListenerSet,
}

impl Clone for Graph {
    fn clone(&self) -> Self {
        // Copy the structure only: listeners, history and the distance
        // snapshot belong to the original.
        Self {
            name: self.name.clone(),
            n: self.n,
            m: self.m,
            directed: self.directed,
            succs: self.succs.clone(),
            preds: self.preds.clone(),
            history: None,
            shortest_paths: OnceCell::new(),
            listeners: ListenerSet::default(),
        }
    }
}

impl Graph {
    /// Create an empty graph with `n` nodes
    pub fn new(name: impl Into<String>, n: usize, directed: bool) -> Self {
        Self {
            name: name.into(),
            n,
            m: 0,
            directed,
            succs: vec![Coalition::new(); n],
            preds: directed.then(|| vec![Coalition::new(); n]),
            history: None,
            shortest_paths: OnceCell::new(),
            listeners: ListenerSet::default(),
        }
    }

    /// Create a graph from an edge list, silently skipping invalid pairs
    pub fn from_edges(name: impl Into<String>, n: usize, directed: bool, edges: &[(usize, usize)]) -> Self {
        let mut graph = Self::new(name, n, directed);
        for &(i, j) in edges {
            graph.add_edge(i, j);
        }
        graph
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of nodes
    pub fn size(&self) -> usize {
        self.n
    }

    pub fn edges_count(&self) -> usize {
        self.m
    }

    /// Number of node pairs an edge could connect
    pub fn possible_edges_count(&self) -> u64 {
        let n = self.n as u64;
        let ordered = n * n.saturating_sub(1);
        if self.directed { ordered } else { ordered / 2 }
    }

    pub fn non_edges_count(&self) -> u64 {
        self.possible_edges_count() - self.m as u64
    }

    /// Fraction of possible edges present
    pub fn density(&self) -> f64 {
        match self.possible_edges_count() {
            0 => 0.0,
            possible => self.m as f64 / possible as f64,
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Edge value with this graph's orientation rules
    pub fn edge(&self, i: usize, j: usize) -> Edge {
        Edge::new(i, j, self.directed)
    }

    /// Validate a node index coming from outside the program
    pub fn check_node(&self, node: usize) -> GraphResult<usize> {
        if node < self.n {
            Ok(node)
        } else {
            Err(GraphError::NodeOutOfRange { node, size: self.n })
        }
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Subscribe to change notifications; subscribing twice is a no-op
    pub fn subscribe(&mut self, listener: Rc<dyn GraphListener>) {
        self.listeners.subscribe(listener);
    }

    pub fn unsubscribe(&mut self, listener: &Rc<dyn GraphListener>) {
        self.listeners.unsubscribe(listener);
    }

    pub fn listeners_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn notify(&self, change: GraphChange) {
        self.listeners.notify(self, &change);
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Add the edge `i -> j` (or `i - j`)
    ///
    /// Returns `false` for self-loops and edges already present.
    pub fn add_edge(&mut self, i: usize, j: usize) -> bool {
        if i == j || self.contains_edge(i, j) {
            return false;
        }
        self.perform_add_edge(i, j);
        if let Some(history) = self.history.as_mut() {
            history.push(Change::Addition { i, j });
        }
        self.notify(GraphChange::Added(self.edge(i, j)));
        true
    }

    /// Remove the edge `i -> j` (or `i - j`)
    ///
    /// Returns `false` if the edge is not present.
    pub fn remove_edge(&mut self, i: usize, j: usize) -> bool {
        if i == j || !self.contains_edge(i, j) {
            return false;
        }
        self.perform_remove_edge(i, j);
        if let Some(history) = self.history.as_mut() {
            history.push(Change::Removal { i, j });
        }
        self.notify(GraphChange::Removed(self.edge(i, j)));
        true
    }

    /// Toggle the presence of an edge
    pub fn swap_edge(&mut self, i: usize, j: usize) -> bool {
        if self.contains_edge(i, j) {
            self.remove_edge(i, j)
        } else {
            self.add_edge(i, j)
        }
    }

    /// Remove every edge touching `i`
    pub fn disconnect_node(&mut self, i: usize) {
        let succs = self.succs[i].clone();
        for j in &succs {
            self.remove_edge(i, j);
        }
        if self.directed {
            let preds = self.preds(i).clone();
            for j in &preds {
                self.remove_edge(j, i);
            }
        }
    }

    pub(crate) fn perform_add_edge(&mut self, i: usize, j: usize) {
        self.succs[i].add(j);
        match self.preds.as_mut() {
            Some(preds) => preds[j].add(i),
            None => self.succs[j].add(i),
        };
        self.m += 1;
    }

    pub(crate) fn perform_remove_edge(&mut self, i: usize, j: usize) {
        self.succs[i].remove(j);
        match self.preds.as_mut() {
            Some(preds) => preds[j].remove(i),
            None => self.succs[j].remove(i),
        };
        self.m -= 1;
    }

    /// Copy of this graph with `k` extra isolated nodes
    pub fn add_nodes(&self, k: usize) -> Graph {
        let mut res = Graph::new(self.name.clone(), self.n + k, self.directed);
        for e in self.edges() {
            res.add_edge(e.i(), e.j());
        }
        res
    }

    // ------------------------------------------------------------------
    // Adjacency queries
    // ------------------------------------------------------------------

    /// Whether the edge exists; out-of-range indices answer `false`
    pub fn contains_edge(&self, i: usize, j: usize) -> bool {
        i < self.n && j < self.n && self.succs[i].contains(j)
    }

    pub fn contains_any_direction_edge(&self, i: usize, j: usize) -> bool {
        self.contains_edge(i, j) || self.contains_edge(j, i)
    }

    pub fn succs(&self, i: usize) -> &Coalition {
        &self.succs[i]
    }

    /// Predecessors; for undirected graphs these are the successors
    pub fn preds(&self, i: usize) -> &Coalition {
        match &self.preds {
            Some(preds) => &preds[i],
            None => &self.succs[i],
        }
    }

    /// All neighbours regardless of direction
    pub fn neighs(&self, i: usize) -> Cow<'_, Coalition> {
        match &self.preds {
            Some(preds) => Cow::Owned(Coalition::union(&self.succs[i], &preds[i])),
            None => Cow::Borrowed(&self.succs[i]),
        }
    }

    pub fn common_succs(&self, i: usize, j: usize) -> Coalition {
        Coalition::intersection(self.succs(i), self.succs(j))
    }

    pub fn common_preds(&self, i: usize, j: usize) -> Coalition {
        Coalition::intersection(self.preds(i), self.preds(j))
    }

    pub fn common_neighs(&self, i: usize, j: usize) -> Coalition {
        if self.directed {
            let mut res = self.common_succs(i, j);
            res.unite(&self.common_preds(i, j));
            res
        } else {
            self.common_succs(i, j)
        }
    }

    pub fn number_of_common_neighs(&self, i: usize, j: usize) -> usize {
        self.neighs(i).count_common(&self.neighs(j))
    }

    pub fn out_degree(&self, i: usize) -> usize {
        self.succs[i].len()
    }

    pub fn in_degree(&self, i: usize) -> usize {
        self.preds(i).len()
    }

    /// Total degree; in and out degrees summed for directed graphs
    pub fn degree(&self, i: usize) -> usize {
        self.out_degree(i) + if self.directed { self.in_degree(i) } else { 0 }
    }

    // ------------------------------------------------------------------
    // Iteration
    // ------------------------------------------------------------------

    pub fn nodes(&self) -> Range<usize> {
        0..self.n
    }

    pub fn nodes_coalition(&self) -> Coalition {
        Coalition::full(self.n)
    }

    /// Every edge exactly once (`i < j` for undirected graphs)
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        let directed = self.directed;
        self.nodes().flat_map(move |i| {
            self.succs[i]
                .iter()
                .filter(move |&j| directed || i < j)
                .map(move |j| Edge::new(i, j, directed))
        })
    }

    /// Every pair of distinct nodes, in row-major order
    pub fn possible_edges(&self) -> PossibleEdges<'_> {
        PossibleEdges::new(self, PairFilter::All)
    }

    /// Every pair of distinct nodes that is not an edge
    pub fn non_edges(&self) -> PossibleEdges<'_> {
        PossibleEdges::new(self, PairFilter::Missing)
    }

    /// Copy with edge directions dropped; borrows `self` if already undirected
    pub fn to_undirected(&self) -> Cow<'_, Graph> {
        if !self.directed {
            return Cow::Borrowed(self);
        }
        let mut res = Graph::new(self.name.clone(), self.n, false);
        for e in self.edges() {
            res.add_edge(e.i(), e.j());
        }
        Cow::Owned(res)
    }

    // ------------------------------------------------------------------
    // Shortest paths
    // ------------------------------------------------------------------

    /// Distance oracle, built from the current edges on first use
    pub fn shortest_paths(&self) -> &ShortestPaths {
        self.shortest_paths.get_or_init(|| ShortestPaths::construct(self))
    }

    /// Drop the cached distance oracle so the next query rebuilds it
    pub fn reset_shortest_paths(&mut self) {
        self.shortest_paths.take();
    }

    pub fn nodes_within_distance(&self, source: usize, distance: u32) -> Coalition {
        let sp = self.shortest_paths();
        self.nodes()
            .filter(|&v| sp.distance(source, v).is_some_and(|d| d <= distance))
            .collect()
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Start recording mutations, discarding any previous history
    pub fn start_recording_history(&mut self) {
        self.history = Some(Vec::new());
    }

    pub fn stop_recording_history(&mut self) {
        self.history = None;
    }

    pub fn is_recording_history(&self) -> bool {
        self.history.is_some()
    }

    pub fn history_size(&self) -> usize {
        self.history.as_ref().map_or(0, Vec::len)
    }

    /// Edge touched by the most recent recorded change
    pub fn last_change(&self) -> Option<Edge> {
        let change = self.history.as_ref()?.last()?;
        Some(change.edge(self.directed))
    }

    /// Edges touched by recorded changes, oldest first
    pub fn changes(&self) -> impl Iterator<Item = Edge> + '_ {
        self.history
            .iter()
            .flatten()
            .map(|change| change.edge(self.directed))
    }

    /// Undo every recorded change and fire a single reset notification
    ///
    /// No-op when history is not being recorded.
    pub fn reset_graph(&mut self) {
        let Some(mut history) = self.history.take() else {
            return;
        };
        let reverted = history.len();
        while let Some(change) = history.pop() {
            history::revert(change, self);
        }
        self.history = Some(history);
        tracing::debug!(graph = %self.name, reverted, "graph reset to recorded origin");
        self.notify(GraphChange::Reset);
    }

    /// Undo the `k` most recent recorded changes
    ///
    /// No-op when history is not being recorded.
    pub fn revert_changes(&mut self, k: usize) {
        let Some(mut history) = self.history.take() else {
            return;
        };
        for _ in 0..k {
            let Some(change) = history.pop() else {
                break;
            };
            let undo = history::revert(change, self);
            self.notify(undo);
        }
        self.history = Some(history);
    }

    // ------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------

    /// Multi-line summary of the graph
    pub fn describe(&self, with_connectivity: bool) -> String {
        let mut output = String::new();
        output.push_str(&format!("Name:       {}\n", self.name));
        output.push_str(&format!("Nodes:      {}\n", self.n));
        output.push_str(&format!("Edges:      {}\n", self.m));
        output.push_str(&format!("Directed:   {}\n", self.directed));
        if with_connectivity {
            output.push_str(&format!("Connected:  {}\n", self.is_connected()));
            output.push_str(&format!("Components: {}\n", self.number_of_connected_components()));
        }
        output
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},n={},m={}", self.name, self.n, self.m)?;
        if self.directed {
            write!(f, ",directed")?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("name", &self.name)
            .field("n", &self.n)
            .field("m", &self.m)
            .field("directed", &self.directed)
            .field("history", &self.history_size())
            .field("listeners", &self.listeners)
            .finish()
    }
}
