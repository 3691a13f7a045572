//! Static graph generators
//!
//! Deterministic shapes:
//! - Cycle: each node linked to the next one
//! - Clique: every pair linked
//! - Grid: `width x height` lattice
//!
//! Random models (all end with [`Graph::force_connectivity`]):
//! - Erdős–Rényi with a target average degree
//! - Barabási–Albert preferential attachment
//! - Watts–Strogatz small world
//! - Configuration model over a power-law degree sequence
//!
//! Plus uniform random trees from Prüfer sequences and disjoint unions.
//! For directed graphs the deterministic, preferential and configuration
//! models add both directions of every link.
//!
//! [`randomly_distort`], [`randomly_remove`] and [`randomly_add`] perturb an
//! existing graph pair by pair.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;

/// Builder for graphs over a fixed node count
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder {
    n: usize,
    directed: bool,
}

impl GraphBuilder {
    pub fn new(n: usize) -> Self {
        Self { n, directed: false }
    }

    pub fn directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    fn empty(&self, name: String) -> Graph {
        let name = if self.directed { format!("d{name}") } else { name };
        Graph::new(name, self.n, self.directed)
    }

    fn link(&self, graph: &mut Graph, i: usize, j: usize) -> bool {
        let added = graph.add_edge(i, j);
        if added && self.directed {
            graph.add_edge(j, i);
        }
        added
    }

    fn check_degree(&self, avg_degree: usize) -> GraphResult<()> {
        if self.n < 2 || avg_degree == 0 || avg_degree >= self.n {
            return Err(GraphError::InvalidParameter(format!(
                "average degree {avg_degree} needs 0 < degree < n = {}",
                self.n
            )));
        }
        Ok(())
    }

    /// Ring `0 - 1 - ... - (n-1) - 0`
    pub fn cycle(self) -> Graph {
        let mut res = self.empty(format!("cycle-{}", self.n));
        for i in 0..self.n {
            self.link(&mut res, i, (i + 1) % self.n);
        }
        res
    }

    /// Complete graph
    pub fn clique(self) -> Graph {
        let mut res = self.empty(format!("clique-{}", self.n));
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                self.link(&mut res, i, j);
            }
        }
        res
    }

    /// Each pair linked independently so the expected degree is `avg_degree`
    pub fn erdos_renyi<R: Rng + ?Sized>(self, avg_degree: usize, rng: &mut R) -> GraphResult<Graph> {
        self.check_degree(avg_degree)?;
        let mut prob = avg_degree as f64 / (self.n - 1) as f64;
        if self.directed {
            prob /= 2.0;
        }
        let mut res = self.empty(format!("er-{}-{avg_degree}", self.n));
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                if rng.random::<f64>() <= prob {
                    res.add_edge(i, j);
                }
                if self.directed && rng.random::<f64>() <= prob {
                    res.add_edge(j, i);
                }
            }
        }
        res.force_connectivity(rng);
        Ok(res)
    }

    /// Preferential attachment: every new node links to `avg_degree / 2`
    /// existing nodes drawn proportionally to their degree
    pub fn barabasi_albert<R: Rng + ?Sized>(self, avg_degree: usize, rng: &mut R) -> GraphResult<Graph> {
        self.check_degree(avg_degree)?;
        let m = avg_degree / 2;
        if m == 0 {
            return Err(GraphError::InvalidParameter(format!(
                "average degree {avg_degree} adds no edges per node"
            )));
        }
        let mut res = self.empty(format!("ba-{}-{avg_degree}", self.n));
        for i in 0..=m {
            for j in 0..i {
                self.link(&mut res, i, j);
            }
        }
        for i in (m + 1)..self.n {
            let degrees: Vec<usize> = (0..i).map(|k| res.degree(k)).collect();
            let dist = WeightedIndex::new(&degrees)
                .map_err(|e| GraphError::InvalidParameter(format!("attachment weights: {e}")))?;
            let mut added = 0;
            while added < m {
                let j = dist.sample(rng);
                if !res.contains_edge(i, j) {
                    self.link(&mut res, i, j);
                    added += 1;
                }
            }
        }
        res.force_connectivity(rng);
        Ok(res)
    }

    /// Ring lattice with `avg_degree / 2` neighbours per side, each edge
    /// rewired to a random new endpoint with probability `beta`
    pub fn small_world<R: Rng + ?Sized>(self, avg_degree: usize, beta: f64, rng: &mut R) -> GraphResult<Graph> {
        self.check_degree(avg_degree)?;
        if !(0.0..=1.0).contains(&beta) {
            return Err(GraphError::InvalidParameter(format!("rewiring probability {beta} outside [0, 1]")));
        }
        let name = format!("ws-{}-{avg_degree}-{}", self.n, (beta * 100.0).round() as u32);
        let mut res = self.empty(name);
        for i in 0..self.n {
            for j in (i + 1)..=(i + avg_degree / 2) {
                self.link(&mut res, i, j % self.n);
            }
        }
        let lattice: Vec<_> = res.edges().collect();
        for e in lattice {
            let i = e.i();
            if rng.random::<f64>() >= beta || res.out_degree(i) >= self.n - 1 {
                continue;
            }
            let j = loop {
                let j = rng.random_range(0..self.n);
                if j != i && !res.contains_edge(i, j) {
                    break j;
                }
            };
            res.remove_edge(e.i(), e.j());
            res.add_edge(i, j);
        }
        res.force_connectivity(rng);
        Ok(res)
    }

    /// Configuration model: degrees drawn from `P(k) ~ k^-alpha` on
    /// `[k_min, k_max]`, stubs paired at random
    ///
    /// Stubs that would form a self-loop or a duplicate edge get up to
    /// [`PAIRING_ROUNDS`] reshuffles; if some are still left the whole
    /// sequence is redrawn, at most [`CONFIGURATION_ATTEMPTS`] times.
    pub fn scale_free_configuration<R: Rng + ?Sized>(
        self,
        alpha: f64,
        k_min: usize,
        k_max: usize,
        rng: &mut R,
    ) -> GraphResult<Graph> {
        if self.n < 2 || k_min == 0 || k_min > k_max || k_max >= self.n {
            return Err(GraphError::InvalidParameter(format!(
                "degree range [{k_min}, {k_max}] needs 0 < k_min <= k_max < n = {}",
                self.n
            )));
        }
        if !alpha.is_finite() {
            return Err(GraphError::InvalidParameter(format!("power-law exponent {alpha} is not finite")));
        }
        let mut name = format!("sfc-{}-{}", self.n, alpha.round() as i64);
        if k_min != 1 || k_max != self.n - 1 {
            name.push_str(&format!("-{k_min}-{k_max}"));
        }
        let weights: Vec<f64> = (k_min..=k_max).map(|k| (k as f64).powf(-alpha)).collect();
        let dist = WeightedIndex::new(&weights)
            .map_err(|e| GraphError::InvalidParameter(format!("degree weights: {e}")))?;

        for attempt in 1..=CONFIGURATION_ATTEMPTS {
            let mut degrees: Vec<usize> = (0..self.n).map(|_| k_min + dist.sample(rng)).collect();
            if degrees.iter().sum::<usize>() % 2 != 0 {
                degrees[0] = if degrees[0] < k_max { degrees[0] + 1 } else { degrees[0] - 1 };
            }
            let mut stubs: Vec<usize> = degrees
                .iter()
                .enumerate()
                .flat_map(|(v, &d)| std::iter::repeat_n(v, d))
                .collect();

            let mut res = self.empty(name.clone());
            for _ in 0..PAIRING_ROUNDS {
                if stubs.is_empty() {
                    break;
                }
                stubs.shuffle(rng);
                let mut failures = Vec::new();
                for pair in stubs.chunks_exact(2) {
                    if !self.link(&mut res, pair[0], pair[1]) {
                        failures.extend_from_slice(pair);
                    }
                }
                stubs = failures;
            }
            if stubs.is_empty() {
                res.force_connectivity(rng);
                return Ok(res);
            }
            debug!(graph = %name, attempt, unpaired = stubs.len(), "redrawing degree sequence");
        }
        Err(GraphError::InvalidParameter(format!(
            "no simple graph found for degree range [{k_min}, {k_max}] after {CONFIGURATION_ATTEMPTS} attempts"
        )))
    }

    /// Uniform random labelled tree decoded from a random Prüfer sequence
    pub fn prufer_tree<R: Rng + ?Sized>(self, rng: &mut R) -> GraphResult<Graph> {
        if self.n < 2 {
            return Err(GraphError::InvalidParameter(format!("a tree needs at least 2 nodes, got {}", self.n)));
        }
        let sequence: Vec<usize> = (0..self.n - 2).map(|_| rng.random_range(0..self.n)).collect();
        let mut degree = vec![1usize; self.n];
        for &v in &sequence {
            degree[v] += 1;
        }
        let mut res = self.empty(format!("pr-{}", self.n));
        for &v in &sequence {
            if let Some(leaf) = degree.iter().position(|&d| d == 1) {
                self.link(&mut res, v, leaf);
                degree[v] -= 1;
                degree[leaf] -= 1;
            }
        }
        let last: Vec<usize> = (0..self.n).filter(|&v| degree[v] == 1).collect();
        if let [a, b] = last[..] {
            self.link(&mut res, a, b);
        }
        Ok(res)
    }
}

/// Reshuffles of the leftover stubs before a configuration model redraws
pub const PAIRING_ROUNDS: usize = 5;

/// Degree sequences tried before a configuration model gives up
pub const CONFIGURATION_ATTEMPTS: usize = 100;

fn check_probability(prob: f64) -> GraphResult<()> {
    if !(0.0..=1.0).contains(&prob) {
        return Err(GraphError::InvalidParameter(format!("probability {prob} outside [0, 1]")));
    }
    Ok(())
}

/// Copy of `graph` keeping each pair for which `keep(present, draw)` holds,
/// with one uniform draw in `[0, 1)` per possible pair
fn perturb<R, F>(graph: &Graph, rng: &mut R, mut keep: F) -> Graph
where
    R: Rng + ?Sized,
    F: FnMut(bool, f64) -> bool,
{
    let mut res = Graph::new(graph.name(), graph.size(), graph.is_directed());
    for e in graph.possible_edges() {
        let present = graph.contains_edge(e.i(), e.j());
        if keep(present, rng.random::<f64>()) {
            res.add_edge(e.i(), e.j());
        }
    }
    res
}

/// Flip every pair independently with probability `prob`: edges are dropped
/// and non-edges added
pub fn randomly_distort<R: Rng + ?Sized>(graph: &Graph, prob: f64, rng: &mut R) -> GraphResult<Graph> {
    check_probability(prob)?;
    Ok(perturb(graph, rng, |present, r| if present { r >= prob } else { r < prob }))
}

/// Drop every edge independently with probability `prob`
pub fn randomly_remove<R: Rng + ?Sized>(graph: &Graph, prob: f64, rng: &mut R) -> GraphResult<Graph> {
    check_probability(prob)?;
    Ok(perturb(graph, rng, |present, r| present && r >= prob))
}

/// Add every missing edge independently with probability `prob`
pub fn randomly_add<R: Rng + ?Sized>(graph: &Graph, prob: f64, rng: &mut R) -> GraphResult<Graph> {
    check_probability(prob)?;
    Ok(perturb(graph, rng, |present, r| present || r < prob))
}

/// `width x height` lattice, node `row * width + col`
pub fn grid(width: usize, height: usize, directed: bool) -> Graph {
    let builder = GraphBuilder::new(width * height).directed(directed);
    let mut res = builder.empty(format!("grid-{width}-{height}"));
    for row in 0..height {
        for col in 0..width {
            let v = row * width + col;
            if col + 1 < width {
                builder.link(&mut res, v, v + 1);
            }
            if row + 1 < height {
                builder.link(&mut res, v, v + width);
            }
        }
    }
    res
}

/// Disjoint union; the nodes of each graph are shifted past the previous ones
pub fn combine(graphs: &[Graph]) -> GraphResult<Graph> {
    let directed = graphs.first().is_some_and(Graph::is_directed);
    if graphs.iter().any(|g| g.is_directed() != directed) {
        return Err(GraphError::InvalidParameter(
            "cannot combine directed and undirected graphs".to_string(),
        ));
    }
    let n = graphs.iter().map(Graph::size).sum();
    let name = graphs.iter().map(Graph::name).collect::<Vec<_>>().join("+");
    let mut res = Graph::new(name, n, directed);
    let mut offset = 0;
    for g in graphs {
        for e in g.edges() {
            res.add_edge(e.i() + offset, e.j() + offset);
        }
        offset += g.size();
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_deterministic_shapes() {
        let cycle = GraphBuilder::new(5).cycle();
        assert_eq!(cycle.edges_count(), 5);
        assert!(cycle.nodes().all(|v| cycle.degree(v) == 2));

        let clique = GraphBuilder::new(5).directed(true).clique();
        assert_eq!(clique.edges_count(), 20);
        assert_eq!(clique.name(), "dclique-5");

        let g = grid(3, 2, false);
        assert_eq!(g.size(), 6);
        assert_eq!(g.edges_count(), 7);
        assert!(g.contains_edge(1, 4));
    }

    #[test]
    fn test_erdos_renyi_connected() {
        let mut rng = StdRng::seed_from_u64(3);
        let g = GraphBuilder::new(60).erdos_renyi(4, &mut rng).unwrap();
        assert!(g.is_connected());
        let avg = 2.0 * g.edges_count() as f64 / 60.0;
        assert!((2.5..6.0).contains(&avg), "average degree {avg}");
    }

    #[test]
    fn test_barabasi_albert_edge_count() {
        let mut rng = StdRng::seed_from_u64(8);
        let g = GraphBuilder::new(50).barabasi_albert(4, &mut rng).unwrap();
        // Seed triangle plus two edges per later node
        assert_eq!(g.edges_count(), 3 + 2 * 47);
        assert!(g.is_connected());
    }

    #[test]
    fn test_small_world_keeps_edge_count() {
        let mut rng = StdRng::seed_from_u64(21);
        let g = GraphBuilder::new(40).small_world(4, 0.3, &mut rng).unwrap();
        assert!(g.edges_count() >= 80);
        assert!(g.is_connected());

        let lattice = GraphBuilder::new(40).small_world(4, 0.0, &mut rng).unwrap();
        assert_eq!(lattice.edges_count(), 80);
        assert!(lattice.nodes().all(|v| lattice.degree(v) == 4));
    }

    #[test]
    fn test_prufer_tree_is_spanning_tree() {
        let mut rng = StdRng::seed_from_u64(13);
        for n in [2, 3, 10, 31] {
            let g = GraphBuilder::new(n).prufer_tree(&mut rng).unwrap();
            assert_eq!(g.edges_count(), n - 1);
            assert!(g.is_connected());
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(GraphBuilder::new(5).erdos_renyi(5, &mut rng).is_err());
        assert!(GraphBuilder::new(5).barabasi_albert(1, &mut rng).is_err());
        assert!(GraphBuilder::new(5).small_world(2, 1.5, &mut rng).is_err());
        assert!(GraphBuilder::new(1).prufer_tree(&mut rng).is_err());
    }

    #[test]
    fn test_scale_free_configuration() {
        let mut rng = StdRng::seed_from_u64(17);
        let g = GraphBuilder::new(80)
            .scale_free_configuration(2.0, 2, 8, &mut rng)
            .unwrap();
        assert_eq!(g.name(), "sfc-80-2-2-8");
        assert!(g.is_connected());
        assert!(g.nodes().all(|v| g.degree(v) >= 2));
        // Bridges only add degree where components met
        let high = g.nodes().filter(|&v| g.degree(v) > 9).count();
        assert!(high <= g.size() / 10, "{high} nodes above k_max + 1");

        let full = GraphBuilder::new(20).scale_free_configuration(2.5, 1, 19, &mut rng).unwrap();
        assert_eq!(full.name(), "sfc-20-3");
    }

    #[test]
    fn test_scale_free_configuration_rejects_bad_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let builder = GraphBuilder::new(10);
        assert!(builder.scale_free_configuration(2.0, 0, 3, &mut rng).is_err());
        assert!(builder.scale_free_configuration(2.0, 4, 3, &mut rng).is_err());
        assert!(builder.scale_free_configuration(2.0, 1, 10, &mut rng).is_err());
        assert!(builder.scale_free_configuration(f64::NAN, 1, 3, &mut rng).is_err());
    }

    #[test]
    fn test_random_perturbations_extremes() {
        let mut rng = StdRng::seed_from_u64(4);
        let g = GraphBuilder::new(12).cycle();

        assert_eq!(randomly_remove(&g, 0.0, &mut rng).unwrap().edges_count(), 12);
        assert_eq!(randomly_remove(&g, 1.0, &mut rng).unwrap().edges_count(), 0);
        assert_eq!(randomly_add(&g, 1.0, &mut rng).unwrap().edges_count(), 66);
        assert_eq!(randomly_add(&g, 0.0, &mut rng).unwrap().edges_count(), 12);

        let same = randomly_distort(&g, 0.0, &mut rng).unwrap();
        assert!(g.edges().all(|e| same.contains_edge(e.i(), e.j())));
        assert_eq!(same.edges_count(), 12);
        let complement = randomly_distort(&g, 1.0, &mut rng).unwrap();
        assert_eq!(complement.edges_count() as u64, g.non_edges_count());
        assert!(g.edges().all(|e| !complement.contains_edge(e.i(), e.j())));

        assert!(randomly_add(&g, -0.1, &mut rng).is_err());
        assert!(randomly_distort(&g, 1.5, &mut rng).is_err());
    }

    #[test]
    fn test_random_perturbations_subset_and_superset() {
        let mut rng = StdRng::seed_from_u64(9);
        let g = GraphBuilder::new(30).directed(true).erdos_renyi(4, &mut rng).unwrap();

        let thinned = randomly_remove(&g, 0.5, &mut rng).unwrap();
        assert!(thinned.is_directed());
        assert!(thinned.edges().all(|e| g.contains_edge(e.i(), e.j())));

        let thickened = randomly_add(&g, 0.1, &mut rng).unwrap();
        assert!(g.edges().all(|e| thickened.contains_edge(e.i(), e.j())));
        assert!(thickened.edges_count() > g.edges_count());
        assert_eq!(thickened.name(), g.name());
    }

    #[test]
    fn test_combine_offsets_nodes() {
        let a = GraphBuilder::new(3).cycle();
        let b = GraphBuilder::new(2).clique();
        let g = combine(&[a, b]).unwrap();
        assert_eq!(g.size(), 5);
        assert_eq!(g.edges_count(), 4);
        assert!(g.contains_edge(3, 4));
        assert_eq!(g.name(), "cycle-3+clique-2");
        assert_eq!(g.number_of_connected_components(), 2);

        let d = GraphBuilder::new(2).directed(true).clique();
        assert!(combine(&[GraphBuilder::new(2).clique(), d]).is_err());
    }
}
