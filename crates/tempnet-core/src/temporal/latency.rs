//! Fastest temporal paths between all node pairs
//!
//! [`LatencyTable::compute`] runs a backward sweep over the horizon: at every
//! time step each active contact `i -> j` is offered as a one-hop path and
//! then extended by the best path leaving `j` strictly later. Each ordered
//! pair ends up with a list of [`PathRec`] sorted by start time; a record
//! answers every query departing after the previous record's start.
//!
//! Traversing a contact takes one time unit, so a path departing at `t`
//! through contact `(i, j)` reaches `j` at `t + 1` and can only continue on
//! contacts active at `t + 1` or later.
//!
//! [`Latency`] wraps the table in a lazily rebuilt cache. It is subscribed to
//! a [`TemporalGraph`](super::TemporalGraph) and drops the table on every
//! change notification; there is no incremental update.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, trace};

use super::{TemporalGraph, Time};
use crate::coalition::Coalition;
use crate::graph::Graph;
use crate::listener::{GraphChange, GraphListener};

/// Best known path for departures up to `start`
#[derive(Debug, Clone, PartialEq)]
pub struct PathRec {
    start: Time,
    duration: Time,
    number: u64,
    succs: Coalition,
    dummy: bool,
}

impl PathRec {
    fn new(start: Time, duration: Time, number: u64, hop: usize) -> Self {
        Self {
            start,
            duration,
            number,
            succs: Coalition::singleton(hop),
            dummy: false,
        }
    }

    /// Departure time of the path
    pub fn start(&self) -> Time {
        self.start
    }

    pub fn duration(&self) -> Time {
        self.duration
    }

    pub fn arrival(&self) -> Time {
        self.start + self.duration
    }

    /// Number of distinct fastest paths departing at `start`
    pub fn number(&self) -> u64 {
        self.number
    }

    /// First hops shared by the fastest paths
    pub fn succs(&self) -> &Coalition {
        &self.succs
    }

    /// Padding record that only closes the horizon; not a real path
    pub fn is_dummy(&self) -> bool {
        self.dummy
    }
}

impl fmt::Display for PathRec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(t={}, d={}, n={}, s={}",
            self.start, self.duration, self.number, self.succs
        )?;
        if self.dummy {
            write!(f, ", dummy")?;
        }
        write!(f, ")")
    }
}

/// Offer a path departing at `t` and arriving at `arrival` to a record list
/// kept in descending start order (the last element departs earliest).
///
/// Ties at the same departure merge, so the outcome does not depend on the
/// order in which simultaneous contacts are processed.
fn offer(list: &mut Vec<PathRec>, t: Time, arrival: Time, number: u64, hop: usize) {
    match list.last_mut() {
        Some(front) if front.start == t => {
            if arrival < front.arrival() {
                *front = PathRec::new(t, arrival - t, number, hop);
            } else if arrival == front.arrival() && front.succs.add(hop) {
                front.number = front.number.saturating_add(number);
            }
        }
        Some(front) if arrival >= front.arrival() => {}
        _ => list.push(PathRec::new(t, arrival - t, number, hop)),
    }
}

/// All-pairs fastest temporal paths of one graph snapshot
#[derive(Debug, Clone)]
pub struct LatencyTable {
    n: usize,
    horizon: Time,
    records: Vec<Vec<PathRec>>,
    average: Vec<f64>,
}

impl LatencyTable {
    /// Run the backward sweep over `graph`
    pub fn compute(graph: &TemporalGraph) -> Self {
        let started = Instant::now();
        let n = graph.size();
        let horizon = graph.t();

        let mut contacts: Vec<Vec<(usize, usize)>> = vec![Vec::new(); horizon as usize];
        for (edge, timeline) in graph.timelines() {
            for t in timeline.iter() {
                contacts[t as usize].push((edge.i(), edge.j()));
                if !edge.is_directed() {
                    contacts[t as usize].push((edge.j(), edge.i()));
                }
            }
        }

        let mut path: Vec<Vec<PathRec>> = vec![Vec::new(); n * n];
        for t in (0..horizon).rev() {
            for &(i, j) in &contacts[t as usize] {
                offer(&mut path[i * n + j], t, t + 1, 1, j);
                for k in 0..n {
                    if k == i || k == j {
                        continue;
                    }
                    let onward = &path[j * n + k];
                    let best = match onward.last() {
                        Some(front) if front.start == t => onward.iter().nth_back(1),
                        front => front,
                    };
                    if let Some(rec) = best {
                        let (arrival, number) = (rec.arrival(), rec.number);
                        offer(&mut path[i * n + k], t, arrival, number, j);
                    }
                }
            }
        }

        let mut average = vec![0.0; n * n];
        for (idx, list) in path.iter_mut().enumerate() {
            if idx / n == idx % n {
                continue;
            }
            list.reverse();
            average[idx] = close_horizon(list, horizon);
        }

        debug!(
            nodes = n,
            horizon,
            elapsed_us = started.elapsed().as_micros() as u64,
            "latency table recomputed"
        );
        Self {
            n,
            horizon,
            records: path,
            average,
        }
    }

    pub fn size(&self) -> usize {
        self.n
    }

    /// Horizon `T` the table was computed for
    pub fn horizon(&self) -> Time {
        self.horizon
    }

    /// Records of a pair in ascending start order, dummy included
    pub fn records(&self, i: usize, j: usize) -> &[PathRec] {
        &self.records[i * self.n + j]
    }

    /// Record answering a departure at `t`: the first one starting at or after it
    pub fn record(&self, i: usize, j: usize, t: Time) -> Option<&PathRec> {
        let list = self.records(i, j);
        list.get(list.partition_point(|rec| rec.start < t))
    }

    /// Time needed to reach `j` from `i` departing at `t`, `None` if unreachable
    pub fn latency(&self, i: usize, j: usize, t: Time) -> Option<Time> {
        if i == j {
            return Some(0);
        }
        self.record(i, j, t)
            .filter(|rec| !rec.dummy)
            .map(|rec| rec.arrival() - t)
    }

    /// Latency averaged over all departures in `[0, T)`; infinite when unreachable
    pub fn average_latency(&self, i: usize, j: usize) -> f64 {
        self.average[i * self.n + j]
    }

    pub fn is_reachable(&self, i: usize, j: usize) -> bool {
        i == j || !self.records(i, j).is_empty()
    }

    /// Ordered pairs of distinct nodes joined by at least one temporal path
    pub fn reachable_pairs(&self) -> usize {
        (0..self.n)
            .flat_map(|i| (0..self.n).map(move |j| (i, j)))
            .filter(|&(i, j)| i != j && !self.records(i, j).is_empty())
            .count()
    }
}

/// Append the horizon dummy and integrate latency over all departures
fn close_horizon(list: &mut Vec<PathRec>, horizon: Time) -> f64 {
    let Some(first) = list.first().cloned() else {
        return f64::INFINITY;
    };
    let last_start = horizon - 1;
    if list.last().is_some_and(|rec| rec.start < last_start) {
        list.push(PathRec {
            start: last_start,
            duration: first.arrival(),
            number: first.number,
            succs: first.succs.clone(),
            dummy: true,
        });
    }
    if last_start == 0 {
        return first.duration as f64;
    }

    let mut sum = 0.0;
    let mut prev = 0;
    for rec in list.iter() {
        let span = (rec.start - prev) as f64;
        sum += span * (span / 2.0 + rec.duration as f64);
        prev = rec.start;
    }
    sum / last_start as f64
}

/// Lazily recomputed [`LatencyTable`] invalidated by graph notifications
///
/// Only the owning [`TemporalGraph`] fills the cache; outside the crate it
/// can be inspected and invalidated but not fed another graph's table:
///
/// ```compile_fail
/// use tempnet_core::TemporalGraph;
///
/// let g = TemporalGraph::from_contacts("a", 2, false, &[(0, 1, 0)]);
/// let other = TemporalGraph::new("b", 2, false);
/// g.latency_cache().table(&other);
/// ```
#[derive(Debug, Default)]
pub struct Latency {
    table: RefCell<Option<Rc<LatencyTable>>>,
}

impl Latency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_computed(&self) -> bool {
        self.table.borrow().is_some()
    }

    pub fn invalidate(&self) {
        self.table.borrow_mut().take();
    }

    /// Current table, recomputing it from `graph` if it was invalidated
    pub(crate) fn table(&self, graph: &TemporalGraph) -> Rc<LatencyTable> {
        if let Some(table) = self.table.borrow().as_ref() {
            return Rc::clone(table);
        }
        let table = Rc::new(LatencyTable::compute(graph));
        *self.table.borrow_mut() = Some(Rc::clone(&table));
        table
    }
}

impl GraphListener for Latency {
    fn on_change(&self, graph: &Graph, change: &GraphChange) {
        if self.table.borrow_mut().take().is_some() {
            trace!(graph = %graph.name(), ?change, "latency cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relay() -> TemporalGraph {
        TemporalGraph::from_contacts("relay", 3, false, &[(0, 1, 0), (1, 2, 1)])
    }

    #[test]
    fn test_relay_scenario() {
        let table = LatencyTable::compute(&relay());
        assert_eq!(table.horizon(), 2);
        assert_eq!(table.latency(0, 2, 0), Some(2));
        assert_eq!(table.latency(0, 2, 1), None);
        assert_eq!(table.latency(2, 0, 0), None, "1-2 fires after 0-1");
        assert_eq!(table.latency(0, 1, 0), Some(1));
        assert_eq!(table.latency(1, 2, 0), Some(2), "waits one step for the contact");
    }

    #[test]
    fn test_records_and_dummy() {
        let table = LatencyTable::compute(&relay());
        let records = table.records(0, 2);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].start(), 0);
        assert_eq!(records[0].duration(), 2);
        assert_eq!(records[0].succs(), &Coalition::singleton(1));
        assert!(records[1].is_dummy());
        assert_eq!(records[1].start(), 1);
        assert_eq!(records[1].duration(), 2);
    }

    #[test]
    fn test_average_latency() {
        let table = LatencyTable::compute(&relay());
        // Single span [0, 0] then the dummy span [0, 1]: (1 * (0.5 + 2)) / 1
        assert_eq!(table.average_latency(0, 2), 2.5);
        assert!(table.average_latency(2, 0).is_infinite());
        assert_eq!(table.average_latency(1, 1), 0.0);
    }

    #[test]
    fn test_average_over_several_records() {
        let g = TemporalGraph::from_contacts("twice", 2, false, &[(0, 1, 0), (0, 1, 4)]);
        let table = LatencyTable::compute(&g);
        let starts: Vec<Time> = table.records(0, 1).iter().map(PathRec::start).collect();
        assert_eq!(starts, vec![0, 4]);
        assert!(table.records(0, 1).iter().all(|rec| !rec.is_dummy()));
        // 0 * (0 + 1) + 4 * (2 + 1) over T - 1 = 4
        assert_eq!(table.average_latency(0, 1), 3.0);
        assert_eq!(table.average_latency(1, 0), 3.0);
    }

    #[test]
    fn test_average_with_dummy_after_several_records() {
        // (2, 3) only stretches the horizon to T = 7
        let g = TemporalGraph::from_contacts("tail", 4, false, &[(0, 1, 0), (0, 1, 2), (2, 3, 6)]);
        let table = LatencyTable::compute(&g);
        let records = table.records(0, 1);
        assert_eq!(records.len(), 3);
        assert!(records[2].is_dummy());
        assert_eq!(records[2].start(), 6);
        assert_eq!(records[2].duration(), 1);
        assert_eq!(table.latency(0, 1, 3), None);

        // 0 * (0 + 1) + 2 * (1 + 1) + 4 * (2 + 1) over 6
        let expected = 16.0 / 6.0;
        assert!((table.average_latency(0, 1) - expected).abs() < 1e-12);
        // Single record at the last start: 6 * (3 + 1) over 6
        assert_eq!(table.average_latency(2, 3), 4.0);
    }

    #[test]
    fn test_single_step_horizon() {
        let g = TemporalGraph::from_contacts("pair", 2, false, &[(0, 1, 0)]);
        let table = LatencyTable::compute(&g);
        assert_eq!(table.horizon(), 1);
        assert_eq!(table.average_latency(0, 1), 1.0);
        assert_eq!(table.records(0, 1).len(), 1);
    }

    #[test]
    fn test_tied_paths_merge() {
        // Two relays 1 and 2 both carry 0 -> 3 in two steps
        let g = TemporalGraph::from_contacts(
            "diamond",
            4,
            false,
            &[(0, 1, 0), (0, 2, 0), (1, 3, 1), (2, 3, 1)],
        );
        let table = LatencyTable::compute(&g);
        let rec = table.record(0, 3, 0).unwrap();
        assert_eq!(rec.number(), 2);
        assert_eq!(rec.succs(), &Coalition::from([1, 2]));
        assert_eq!(table.latency(0, 3, 0), Some(2));
    }

    #[test]
    fn test_faster_path_replaces_same_start() {
        // Direct contact at 0 beats the relay through 1
        let g = TemporalGraph::from_contacts("shortcut", 3, true, &[(0, 1, 0), (1, 2, 1), (0, 2, 0)]);
        let table = LatencyTable::compute(&g);
        let rec = table.record(0, 2, 0).unwrap();
        assert_eq!(rec.duration(), 1);
        assert_eq!(rec.succs(), &Coalition::singleton(2));
        assert_eq!(rec.number(), 1);
    }

    #[test]
    fn test_simultaneous_contacts_are_order_invariant() {
        let contacts = [(0, 1, 0), (1, 2, 1), (0, 3, 0), (3, 2, 1), (1, 3, 1), (2, 4, 2), (3, 4, 2)];
        let forward = TemporalGraph::from_contacts("f", 5, false, &contacts);
        let mut reversed_contacts = contacts;
        reversed_contacts.reverse();
        let backward = TemporalGraph::from_contacts("b", 5, false, &reversed_contacts);

        let a = LatencyTable::compute(&forward);
        let b = LatencyTable::compute(&backward);
        for i in 0..5 {
            for j in 0..5 {
                assert_eq!(a.records(i, j), b.records(i, j), "pair ({i},{j})");
            }
        }
        // 0-1-2-4, 0-1-3-4 and 0-3-4 all arrive at 3; 0-3-2-4 departs 3
        // earlier than needed and is dominated by the later 3-4 contact
        let rec = a.record(0, 4, 0).unwrap();
        assert_eq!(rec.arrival(), 3);
        assert_eq!(rec.number(), 3);
    }

    #[test]
    fn test_arrival_is_monotone() {
        let g = TemporalGraph::from_contacts(
            "chain",
            4,
            false,
            &[(0, 1, 0), (0, 1, 4), (1, 2, 2), (1, 2, 5), (2, 3, 3), (2, 3, 7)],
        );
        let table = LatencyTable::compute(&g);
        for i in 0..4 {
            for j in 0..4 {
                let mut last_arrival = 0;
                let mut unreachable = false;
                for t in 0..table.horizon() {
                    match table.latency(i, j, t) {
                        Some(l) => {
                            assert!(!unreachable, "({i},{j}) reachable again at {t}");
                            assert!(t + l >= last_arrival);
                            last_arrival = t + l;
                        }
                        None => unreachable = true,
                    }
                }
            }
        }
    }

    #[test]
    fn test_directed_contacts_one_way() {
        let g = TemporalGraph::from_contacts("d", 2, true, &[(0, 1, 0)]);
        let table = LatencyTable::compute(&g);
        assert_eq!(table.latency(0, 1, 0), Some(1));
        assert_eq!(table.latency(1, 0, 0), None);
        assert_eq!(table.reachable_pairs(), 1);
    }

    #[test]
    fn test_cache_invalidated_by_changes() {
        let mut g = relay();
        assert_eq!(g.latency(0, 2, 0), Some(2));
        assert!(g.latency_cache().is_computed());

        g.add_t_edge(0, 2, 0);
        assert!(!g.latency_cache().is_computed());
        assert_eq!(g.latency(0, 2, 0), Some(1));

        g.remove_t_edge(0, 2, 0);
        assert_eq!(g.latency(0, 2, 0), Some(2));
    }

    #[test]
    fn test_empty_graph() {
        let g = TemporalGraph::new("empty", 3, false);
        let table = LatencyTable::compute(&g);
        assert_eq!(table.horizon(), 1);
        assert_eq!(table.latency(0, 1, 0), None);
        assert_eq!(table.reachable_pairs(), 0);
    }
}
