//! Change notification for graphs
//!
//! Listeners are invoked synchronously, on the call stack of the mutation
//! that triggered them, after the mutation has been committed. A listener
//! must not mutate the graph it observes.

use std::rc::Rc;

use crate::edge::Edge;
use crate::graph::Graph;

/// A committed change to a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphChange {
    /// An edge appeared
    Added(Edge),
    /// An edge disappeared
    Removed(Edge),
    /// An existing edge changed in some other way (e.g. its timeline)
    Other(Edge),
    /// The whole recorded history was rolled back
    Reset,
}

impl GraphChange {
    pub fn edge(&self) -> Option<Edge> {
        match self {
            GraphChange::Added(e) | GraphChange::Removed(e) | GraphChange::Other(e) => Some(*e),
            GraphChange::Reset => None,
        }
    }
}

/// Observer of graph changes
///
/// Listeners are shared handles, so state they accumulate lives behind
/// interior mutability.
pub trait GraphListener {
    fn on_change(&self, graph: &Graph, change: &GraphChange);
}

/// Registry of subscribed listeners
#[derive(Default)]
pub(crate) struct ListenerSet {
    listeners: Vec<Rc<dyn GraphListener>>,
}

impl ListenerSet {
    /// Subscribe a listener; subscribing twice keeps a single entry
    pub fn subscribe(&mut self, listener: Rc<dyn GraphListener>) {
        self.unsubscribe(&listener);
        self.listeners.push(listener);
    }

    pub fn unsubscribe(&mut self, listener: &Rc<dyn GraphListener>) {
        self.listeners.retain(|l| !Rc::ptr_eq(l, listener));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn notify(&self, graph: &Graph, change: &GraphChange) {
        for listener in &self.listeners {
            listener.on_change(graph, change);
        }
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ListenerSet({})", self.listeners.len())
    }
}

/// Listener that records every change it sees, for tests and diagnostics
#[derive(Debug, Default)]
pub struct ChangeLog {
    changes: std::cell::RefCell<Vec<GraphChange>>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> Vec<GraphChange> {
        self.changes.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.changes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.changes.borrow_mut().clear();
    }
}

impl GraphListener for ChangeLog {
    fn on_change(&self, _graph: &Graph, change: &GraphChange) {
        self.changes.borrow_mut().push(*change);
    }
}
