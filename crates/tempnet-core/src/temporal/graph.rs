//! Graphs whose edges are active at discrete time points
//!
//! A [`TemporalGraph`] wraps a [`Graph`] and attaches a [`Timeline`] to every
//! edge. The base edge exists exactly while its timeline is non-empty. Read
//! access to the static structure goes through `Deref<Target = Graph>`;
//! mutations go through the temporal API so timelines and edges stay in step.
//!
//! Listeners subscribed to the temporal graph see `Added` when a base edge
//! appears, `Removed` when it disappears and `Other` when only its timeline
//! changed.

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use rand::Rng;
use tracing::debug;

use super::{MAX_CONTACT_TIME, Time};
use super::latency::{Latency, LatencyTable, PathRec};
use super::timeline::Timeline;
use crate::coalition::Coalition;
use crate::connectivity::{plan_bridges, random_bridge};
use crate::edge::Edge;
use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::listener::{GraphChange, GraphListener};

/// A recorded timeline edit holding exactly the points that changed
#[derive(Debug, Clone, PartialEq, Eq)]
enum TemporalChange {
    Addition { i: usize, j: usize, points: Vec<Time> },
    Removal { i: usize, j: usize, points: Vec<Time> },
}

/// Graph with a timeline per edge and a cached latency table
pub struct TemporalGraph {
    graph: Graph,
    timelines: HashMap<Edge, Timeline>,
    max_time: Time,
    history: Option<Vec<TemporalChange>>,
    latency: Rc<Latency>,
}

impl TemporalGraph {
    pub fn new(name: impl Into<String>, n: usize, directed: bool) -> Self {
        Self::assemble(Graph::new(name, n, directed), HashMap::new(), 0)
    }

    /// Build from `(i, j, t)` contacts, skipping self-loops
    pub fn from_contacts(
        name: impl Into<String>,
        n: usize,
        directed: bool,
        contacts: &[(usize, usize, Time)],
    ) -> Self {
        let mut res = Self::new(name, n, directed);
        for &(i, j, t) in contacts {
            res.add_t_edge(i, j, t);
        }
        res
    }

    fn assemble(mut graph: Graph, timelines: HashMap<Edge, Timeline>, max_time: Time) -> Self {
        let latency = Rc::new(Latency::new());
        graph.subscribe(latency.clone());
        Self {
            graph,
            timelines,
            max_time,
            history: None,
            latency,
        }
    }

    /// Static structure; also reachable through `Deref`
    pub fn base(&self) -> &Graph {
        &self.graph
    }

    /// Horizon `T`: one past the largest active time point
    pub fn t(&self) -> Time {
        self.max_time + 1
    }

    /// Largest active time point, 0 without contacts
    pub fn max_time(&self) -> Time {
        self.max_time
    }

    /// Drop the base graph's distance snapshot so the next query sees the
    /// current edges
    pub fn reset_shortest_paths(&mut self) {
        self.graph.reset_shortest_paths();
    }

    pub fn timeline(&self, i: usize, j: usize) -> Option<&Timeline> {
        self.timelines.get(&self.graph.edge(i, j))
    }

    /// Every edge with its timeline, in arbitrary order
    pub fn timelines(&self) -> impl Iterator<Item = (&Edge, &Timeline)> {
        self.timelines.iter()
    }

    pub fn subscribe(&mut self, listener: Rc<dyn GraphListener>) {
        self.graph.subscribe(listener);
    }

    pub fn unsubscribe(&mut self, listener: &Rc<dyn GraphListener>) {
        self.graph.unsubscribe(listener);
    }

    fn check_pair(&self, i: usize, j: usize) {
        let n = self.graph.size();
        assert!(i < n && j < n, "pair ({i}, {j}) out of range for {n} nodes");
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Activate the edge at `t`
    ///
    /// Returns `false` for self-loops, an already active point or `t` past
    /// [`MAX_CONTACT_TIME`].
    pub fn add_t_edge(&mut self, i: usize, j: usize, t: Time) -> bool {
        t <= MAX_CONTACT_TIME && self.perform_add(i, j, t, t)
    }

    /// Activate the edge on every point of `[begin, end]`
    ///
    /// Returns whether any point was new.
    pub fn add_t_edge_range(&mut self, i: usize, j: usize, begin: Time, end: Time) -> GraphResult<bool> {
        if begin > end {
            return Err(GraphError::InvalidInterval { begin, end });
        }
        if end > MAX_CONTACT_TIME {
            return Err(GraphError::TimeOutOfRange {
                time: end,
                limit: MAX_CONTACT_TIME,
            });
        }
        Ok(self.perform_add(i, j, begin, end))
    }

    /// Deactivate the edge at `t`; `false` if it was not active
    pub fn remove_t_edge(&mut self, i: usize, j: usize, t: Time) -> bool {
        self.perform_remove(i, j, t, t)
    }

    /// Deactivate the edge on every point of `[begin, end]`
    ///
    /// Returns whether any point was active.
    pub fn remove_t_edge_range(&mut self, i: usize, j: usize, begin: Time, end: Time) -> GraphResult<bool> {
        if begin > end {
            return Err(GraphError::InvalidInterval { begin, end });
        }
        Ok(self.perform_remove(i, j, begin, end))
    }

    /// Drop the whole timeline of an edge, and with it the edge
    pub fn remove_edge(&mut self, i: usize, j: usize) -> bool {
        match self.timeline(i, j).and_then(|tl| Some((tl.first()?, tl.last()?))) {
            Some((first, last)) => self.perform_remove(i, j, first, last),
            None => false,
        }
    }

    fn perform_add(&mut self, i: usize, j: usize, begin: Time, end: Time) -> bool {
        if i == j {
            return false;
        }
        self.check_pair(i, j);
        let e = self.graph.edge(i, j);
        let timeline = self.timelines.entry(e).or_default();
        let points: Vec<Time> = (begin..=end).filter(|&t| timeline.add(t)).collect();
        if points.is_empty() {
            return false;
        }
        self.max_time = self.max_time.max(end);
        if let Some(history) = self.history.as_mut() {
            history.push(TemporalChange::Addition { i, j, points });
        }
        if self.graph.contains_edge(i, j) {
            self.graph.notify(GraphChange::Other(e));
        } else {
            self.graph.add_edge(i, j);
        }
        true
    }

    fn perform_remove(&mut self, i: usize, j: usize, begin: Time, end: Time) -> bool {
        let e = self.graph.edge(i, j);
        let Some(timeline) = self.timelines.get_mut(&e) else {
            return false;
        };
        let range = begin..=end;
        let mut points: Vec<Time> = if (end - begin) as usize >= timeline.len() {
            timeline.iter().filter(|t| range.contains(t)).collect()
        } else {
            range.filter(|&t| timeline.contains(t)).collect()
        };
        if points.is_empty() {
            return false;
        }
        points.sort_unstable();
        timeline.remove_range(begin, end);
        let emptied = timeline.is_empty();
        if emptied {
            self.timelines.remove(&e);
        }
        self.rescan_max_time();
        if let Some(history) = self.history.as_mut() {
            history.push(TemporalChange::Removal { i, j, points });
        }
        if emptied {
            self.graph.remove_edge(i, j);
        } else {
            self.graph.notify(GraphChange::Other(e));
        }
        true
    }

    fn rescan_max_time(&mut self) {
        self.max_time = self
            .timelines
            .values()
            .filter_map(Timeline::max_time)
            .max()
            .unwrap_or(0);
    }

    /// Join components with bridging edges active at one random time each
    pub fn force_connectivity<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let horizon = self.t();
        let directed = self.graph.is_directed();
        let components = self.graph.connected_components(None);
        let bridges = plan_bridges(&components, |c, last| random_bridge(rng, c, last, directed));
        debug!(graph = %self.graph.name(), bridges = bridges.len(), horizon, "forcing temporal connectivity");
        for e in bridges {
            let t = rng.random_range(0..horizon);
            self.add_t_edge(e.i(), e.j(), t);
        }
    }

    // ------------------------------------------------------------------
    // Time-sliced queries
    // ------------------------------------------------------------------

    pub fn contains_t_edge(&self, i: usize, j: usize, t: Time) -> bool {
        self.timeline(i, j).is_some_and(|tl| tl.contains(t))
    }

    /// Successors of `i` over edges active at `t`
    pub fn t_succs_iter(&self, i: usize, t: Time) -> impl Iterator<Item = usize> + '_ {
        self.graph
            .succs(i)
            .iter()
            .filter(move |&j| self.contains_t_edge(i, j, t))
    }

    /// Predecessors of `i` over edges active at `t`
    pub fn t_preds_iter(&self, i: usize, t: Time) -> impl Iterator<Item = usize> + '_ {
        self.graph
            .preds(i)
            .iter()
            .filter(move |&j| self.contains_t_edge(j, i, t))
    }

    pub fn t_succs(&self, i: usize, t: Time) -> Coalition {
        self.t_succs_iter(i, t).collect()
    }

    pub fn t_preds(&self, i: usize, t: Time) -> Coalition {
        self.t_preds_iter(i, t).collect()
    }

    /// Neighbours of `i` over edges active at `t`, regardless of direction
    pub fn t_neighs(&self, i: usize, t: Time) -> Coalition {
        let mut res = self.t_succs(i, t);
        if self.graph.is_directed() {
            res.extend(self.t_preds_iter(i, t));
        }
        res
    }

    /// Edges active at `t`
    pub fn t_edges(&self, t: Time) -> impl Iterator<Item = Edge> + '_ {
        self.timelines
            .iter()
            .filter(move |(_, tl)| tl.contains(t))
            .map(|(e, _)| *e)
    }

    /// Static snapshot of the edges active at `t`
    pub fn graph_at_time(&self, t: Time) -> Graph {
        let mut res = Graph::new(format!("{}@{t}", self.graph.name()), self.graph.size(), self.graph.is_directed());
        for e in self.t_edges(t) {
            res.add_edge(e.i(), e.j());
        }
        res
    }

    // ------------------------------------------------------------------
    // Contact statistics
    // ------------------------------------------------------------------

    /// Total number of active (edge, time) points
    pub fn contacts_count(&self) -> usize {
        self.timelines.values().map(Timeline::len).sum()
    }

    fn contacts_on(&self, i: usize, j: usize) -> usize {
        self.timeline(i, j).map_or(0, Timeline::len)
    }

    pub fn out_contacts_count(&self, i: usize) -> usize {
        self.graph.succs(i).iter().map(|j| self.contacts_on(i, j)).sum()
    }

    pub fn in_contacts_count(&self, i: usize) -> usize {
        self.graph.preds(i).iter().map(|j| self.contacts_on(j, i)).sum()
    }

    /// Contacts touching `i`; in and out summed for directed graphs
    pub fn node_contacts_count(&self, i: usize) -> usize {
        let out = self.out_contacts_count(i);
        if self.graph.is_directed() { out + self.in_contacts_count(i) } else { out }
    }

    /// Mean timeline length over existing edges
    pub fn average_contacts_number(&self) -> f64 {
        match self.graph.edges_count() {
            0 => 0.0,
            m => self.contacts_count() as f64 / m as f64,
        }
    }

    // ------------------------------------------------------------------
    // Latency
    // ------------------------------------------------------------------

    /// Cache that follows this graph's changes
    pub fn latency_cache(&self) -> &Latency {
        &self.latency
    }

    /// Current latency table, recomputed if the graph changed since last use
    pub fn latency_table(&self) -> Rc<LatencyTable> {
        self.latency.table(self)
    }

    pub fn latency(&self, i: usize, j: usize, t: Time) -> Option<Time> {
        self.latency_table().latency(i, j, t)
    }

    pub fn average_latency(&self, i: usize, j: usize) -> f64 {
        self.latency_table().average_latency(i, j)
    }

    pub fn path_records(&self, i: usize, j: usize) -> Vec<PathRec> {
        self.latency_table().records(i, j).to_vec()
    }

    pub fn path_record(&self, i: usize, j: usize, t: Time) -> Option<PathRec> {
        self.latency_table().record(i, j, t).cloned()
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

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

    /// Undo every recorded timeline edit and fire a single reset notification
    pub fn reset_graph(&mut self) {
        let Some(mut history) = self.history.take() else {
            return;
        };
        let reverted = history.len();
        while let Some(change) = history.pop() {
            self.revert(change);
        }
        self.history = Some(history);
        self.rescan_max_time();
        debug!(graph = %self.graph.name(), reverted, "temporal graph reset to recorded origin");
        self.graph.notify(GraphChange::Reset);
    }

    /// Undo the `k` most recent timeline edits
    pub fn revert_changes(&mut self, k: usize) {
        let Some(mut history) = self.history.take() else {
            return;
        };
        for _ in 0..k {
            let Some(change) = history.pop() else {
                break;
            };
            let undo = self.revert(change);
            self.rescan_max_time();
            self.graph.notify(undo);
        }
        self.history = Some(history);
    }

    fn revert(&mut self, change: TemporalChange) -> GraphChange {
        match change {
            TemporalChange::Addition { i, j, points } => {
                let e = self.graph.edge(i, j);
                let Some(timeline) = self.timelines.get_mut(&e) else {
                    return GraphChange::Other(e);
                };
                for t in points {
                    timeline.remove(t);
                }
                if timeline.is_empty() {
                    self.timelines.remove(&e);
                    self.graph.perform_remove_edge(i, j);
                    GraphChange::Removed(e)
                } else {
                    GraphChange::Other(e)
                }
            }
            TemporalChange::Removal { i, j, points } => {
                let e = self.graph.edge(i, j);
                let timeline = self.timelines.entry(e).or_default();
                for t in points {
                    timeline.add(t);
                }
                if self.graph.contains_edge(i, j) {
                    GraphChange::Other(e)
                } else {
                    self.graph.perform_add_edge(i, j);
                    GraphChange::Added(e)
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------

    /// Multi-line summary including contact statistics
    pub fn describe(&self, with_connectivity: bool) -> String {
        let mut output = self.graph.describe(with_connectivity);
        output.push_str(&format!("Horizon:    {}\n", self.t()));
        output.push_str(&format!("Contacts:   {}\n", self.contacts_count()));
        output.push_str(&format!("Per edge:   {:.2}\n", self.average_contacts_number()));
        output
    }
}

impl Deref for TemporalGraph {
    type Target = Graph;

    fn deref(&self) -> &Graph {
        &self.graph
    }
}

impl Clone for TemporalGraph {
    fn clone(&self) -> Self {
        Self::assemble(self.graph.clone(), self.timelines.clone(), self.max_time)
    }
}

impl fmt::Display for TemporalGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},n={},m={},T={}",
            self.graph.name(),
            self.graph.size(),
            self.graph.edges_count(),
            self.t()
        )?;
        if self.graph.is_directed() {
            write!(f, ",directed")?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for TemporalGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporalGraph")
            .field("graph", &self.graph)
            .field("max_time", &self.max_time)
            .field("contacts", &self.contacts_count())
            .field("history", &self.history_size())
            .finish()
    }
}
