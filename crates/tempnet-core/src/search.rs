//! Graph traversal with visitor hooks
//!
//! A [`Search`] walks the successors of a [`Graph`] in breadth-first or
//! depth-first order and reports what it sees to a [`SearchVisitor`]. Every
//! hook has an empty default, so a visitor only overrides the events it
//! cares about. Visited flags, finished flags and the search tree
//! (`parent`) persist across calls on the same `Search`, which is how
//! [`Search::depth_first_all`] covers every component exactly once.
//!
//! Depth-first search keeps an explicit stack of successor cursors, so deep
//! graphs do not grow the call stack.

use std::collections::VecDeque;
use std::iter::Copied;
use std::slice::Iter;

use crate::coalition::Coalition;
use crate::graph::Graph;

/// Callbacks fired during a [`Search`]
pub trait SearchVisitor {
    /// Before a search starts at `root`
    fn pre_root(&mut self, _root: usize) {}

    /// After every node reachable from `root` has been handled
    fn post_root(&mut self, _root: usize) {}

    /// A node is visited for the first time
    fn node(&mut self, _v: usize) {}

    /// All successors of `v` have been explored (depth-first only)
    fn post_node(&mut self, _v: usize) {}

    /// `to` is discovered through `from`
    fn tree_edge(&mut self, _from: usize, _to: usize) {}

    /// The subtree entered through `from -> to` is finished (depth-first only)
    fn post_tree_edge(&mut self, _from: usize, _to: usize) {}

    /// `from` looks at a successor that was already discovered
    fn touch_visited(&mut self, _from: usize, _to: usize) {}
}

/// Visitor that ignores every event
impl SearchVisitor for () {}

/// Traversal state over a borrowed graph
pub struct Search<'g> {
    graph: &'g Graph,
    visited: Vec<bool>,
    processed: Vec<bool>,
    parent: Vec<Option<usize>>,
}

impl<'g> Search<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let n = graph.size();
        Self {
            graph,
            visited: vec![false; n],
            processed: vec![false; n],
            parent: vec![None; n],
        }
    }

    pub fn is_visited(&self, v: usize) -> bool {
        self.visited[v]
    }

    /// Whether depth-first search has finished `v`
    pub fn is_processed(&self, v: usize) -> bool {
        self.processed[v]
    }

    /// Node through which `v` was discovered; `None` for roots and unvisited nodes
    pub fn parent(&self, v: usize) -> Option<usize> {
        self.parent[v]
    }

    /// Every node visited so far
    pub fn visited(&self) -> Coalition {
        self.graph.nodes().filter(|&v| self.visited[v]).collect()
    }

    /// Tree path from the root of `v`'s search to `v`, empty if unvisited
    pub fn path_to(&self, v: usize) -> Vec<usize> {
        if !self.visited[v] {
            return Vec::new();
        }
        let mut path = vec![v];
        let mut cur = v;
        while let Some(p) = self.parent[cur] {
            path.push(p);
            cur = p;
        }
        path.reverse();
        path
    }

    /// Visit everything reachable from `start` level by level
    ///
    /// Does nothing if `start` was already visited.
    pub fn breadth_first<V: SearchVisitor + ?Sized>(&mut self, start: usize, visitor: &mut V) {
        if self.visited[start] {
            return;
        }
        let graph = self.graph;
        visitor.pre_root(start);
        self.visited[start] = true;
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            visitor.node(v);
            for w in graph.succs(v) {
                if self.visited[w] {
                    visitor.touch_visited(v, w);
                } else {
                    self.visited[w] = true;
                    self.parent[w] = Some(v);
                    visitor.tree_edge(v, w);
                    queue.push_back(w);
                }
            }
        }
        visitor.post_root(start);
    }

    /// Visit everything reachable from `start` branch by branch
    ///
    /// Does nothing if `start` was already visited.
    pub fn depth_first<V: SearchVisitor + ?Sized>(&mut self, start: usize, visitor: &mut V) {
        if self.visited[start] {
            return;
        }
        let graph = self.graph;
        visitor.pre_root(start);
        self.visited[start] = true;
        visitor.node(start);
        let mut stack: Vec<(usize, Copied<Iter<'g, usize>>)> = vec![(start, graph.succs(start).iter())];
        while let Some(top) = stack.last_mut() {
            let v = top.0;
            match top.1.next() {
                Some(w) if !self.visited[w] => {
                    self.parent[w] = Some(v);
                    visitor.tree_edge(v, w);
                    self.visited[w] = true;
                    visitor.node(w);
                    stack.push((w, graph.succs(w).iter()));
                }
                Some(w) => visitor.touch_visited(v, w),
                None => {
                    stack.pop();
                    self.processed[v] = true;
                    visitor.post_node(v);
                    if let Some(p) = self.parent[v] {
                        visitor.post_tree_edge(p, v);
                    }
                }
            }
        }
        visitor.post_root(start);
    }

    /// Depth-first search from every node not reached by an earlier root
    pub fn depth_first_all<V: SearchVisitor + ?Sized>(&mut self, visitor: &mut V) {
        for v in self.graph.nodes() {
            self.depth_first(v, visitor);
        }
    }
}
