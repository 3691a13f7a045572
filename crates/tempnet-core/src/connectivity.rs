//! Connected components and forced connectivity
//!
//! Components are computed on the underlying undirected structure: for
//! directed graphs both successors and predecessors are followed.

use std::collections::VecDeque;

use rand::Rng;
use tracing::debug;

use crate::coalition::Coalition;
use crate::edge::Edge;
use crate::graph::Graph;

impl Graph {
    pub fn is_connected(&self) -> bool {
        self.size() == 0 || self.connected_component(0, None).len() == self.size()
    }

    pub fn number_of_connected_components(&self) -> usize {
        self.connected_components(None).len()
    }

    /// Flood fill from `start`, entering only nodes in `allowed` when given
    pub fn connected_component(&self, start: usize, allowed: Option<&Coalition>) -> Coalition {
        let admissible = |v: usize| allowed.is_none_or(|a| a.contains(v));
        let mut component = Coalition::singleton(start);
        let mut queue = VecDeque::from([start]);

        while let Some(i) = queue.pop_front() {
            let mut visit = |j: usize| {
                if admissible(j) && component.add(j) {
                    queue.push_back(j);
                }
            };
            self.succs(i).iter().for_each(&mut visit);
            if self.is_directed() {
                self.preds(i).iter().for_each(&mut visit);
            }
        }
        component
    }

    /// Partition of all nodes (or of `allowed`) into connected components
    pub fn connected_components(&self, allowed: Option<&Coalition>) -> Vec<Coalition> {
        let mut rest = match allowed {
            Some(a) => a.clone(),
            None => self.nodes_coalition(),
        };
        let mut components = Vec::new();
        while let Some(start) = rest.any() {
            let component = self.connected_component(start, allowed);
            rest.subtract(&component);
            components.push(component);
        }
        components
    }

    /// Largest connected component
    pub fn giant_component(&self) -> Coalition {
        self.connected_components(None)
            .into_iter()
            .max_by_key(Coalition::len)
            .unwrap_or_default()
    }

    /// Join consecutive components with one edge each
    ///
    /// `choose` receives a component and its predecessor in the component
    /// list and picks the bridging edge; `on_added` sees every edge that was
    /// actually inserted.
    pub fn force_connectivity_with<C, H>(&mut self, choose: C, mut on_added: H)
    where
        C: FnMut(&Coalition, &Coalition) -> Edge,
        H: FnMut(&mut Graph, Edge),
    {
        let bridges = plan_bridges(&self.connected_components(None), choose);
        debug!(graph = %self.name(), bridges = bridges.len(), "forcing connectivity");
        for e in bridges {
            if self.add_edge(e.i(), e.j()) {
                on_added(self, e);
            }
        }
    }

    /// Join components through uniformly random endpoints
    pub fn force_connectivity<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let directed = self.is_directed();
        self.force_connectivity_with(|c, last| random_bridge(rng, c, last, directed), |_, _| {});
    }
}

/// One bridging edge per consecutive pair of components
pub(crate) fn plan_bridges<C>(components: &[Coalition], mut choose: C) -> Vec<Edge>
where
    C: FnMut(&Coalition, &Coalition) -> Edge,
{
    components
        .windows(2)
        .map(|pair| choose(&pair[1], &pair[0]))
        .collect()
}

/// Edge between random members of two non-empty components
pub(crate) fn random_bridge<R: Rng + ?Sized>(
    rng: &mut R,
    component: &Coalition,
    previous: &Coalition,
    directed: bool,
) -> Edge {
    let i = component.random_with(rng).unwrap_or_default();
    let j = previous.random_with(rng).unwrap_or_default();
    Edge::new(i, j, directed)
}
