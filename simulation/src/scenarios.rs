//! Pre-defined scenarios for the graph substrate
//!
//! Includes the three-node relay example and a latency survey over
//! generated contact networks.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use tempnet_core::{Graph, GraphBuilder, TemporalGraph};

use crate::config::ScenarioConfig;

/// Summary of a latency survey
#[derive(Debug, Clone, Serialize)]
pub struct LatencyReport {
    pub name: String,
    pub nodes: usize,
    pub edges: usize,
    pub contacts: usize,
    pub horizon: u32,
    /// Fraction of ordered node pairs joined by some temporal path
    pub reachable_fraction: f64,
    /// Pairs drawn for the average below
    pub sampled_pairs: usize,
    /// Sampled pairs with finite average latency
    pub sampled_reachable: usize,
    /// Mean of finite average latencies over the sample, if any
    pub mean_average_latency: Option<f64>,
}

/// Generate a contact network and measure how well it spreads
pub fn run_latency_survey(config: &ScenarioConfig) -> Result<LatencyReport> {
    info!("=== Running Latency Survey ===");
    let mut rng = StdRng::seed_from_u64(config.seed);
    let g = config
        .build_temporal(&mut rng)
        .context("Failed to generate contact network")?;
    info!(graph = %g, contacts = g.contacts_count(), "contact network ready");

    let table = g.latency_table();
    let n = g.size();
    let ordered_pairs = n * n.saturating_sub(1);
    let reachable_fraction = match ordered_pairs {
        0 => 0.0,
        pairs => table.reachable_pairs() as f64 / pairs as f64,
    };

    let sampled_pairs = if n < 2 { 0 } else { config.sampled_pairs };
    let mut finite = Vec::with_capacity(sampled_pairs);
    for _ in 0..sampled_pairs {
        let i = rng.random_range(0..n);
        let j = (i + rng.random_range(1..n)) % n;
        let avg = table.average_latency(i, j);
        debug!(i, j, avg, "sampled pair");
        if avg.is_finite() {
            finite.push(avg);
        }
    }
    let mean_average_latency = (!finite.is_empty()).then(|| finite.iter().sum::<f64>() / finite.len() as f64);

    let report = LatencyReport {
        name: g.name().to_string(),
        nodes: n,
        edges: g.edges_count(),
        contacts: g.contacts_count(),
        horizon: g.t(),
        reachable_fraction,
        sampled_pairs,
        sampled_reachable: finite.len(),
        mean_average_latency,
    };
    info!(
        reachable_pct = 100.0 * report.reachable_fraction,
        mean = ?report.mean_average_latency,
        "survey complete"
    );
    Ok(report)
}

/// Build the configured static backbone and print its summary
pub fn run_describe(config: &ScenarioConfig) -> Result<Graph> {
    info!("=== Describing Topology ===");
    let mut rng = StdRng::seed_from_u64(config.seed);
    let g = config.build_graph(&mut rng).context("Failed to build topology")?;

    println!("{}", g.describe(true));
    let degrees: Vec<usize> = g.nodes().map(|v| g.degree(v)).collect();
    let max_degree = degrees.iter().copied().max().unwrap_or(0);
    let mean_degree = match degrees.len() {
        0 => 0.0,
        len => degrees.iter().sum::<usize>() as f64 / len as f64,
    };
    println!("Mean degree: {mean_degree:.2}");
    println!("Max degree:  {max_degree}");
    println!("Density:     {:.4}", g.density());
    if g.size() > 1 {
        let far = g.shortest_paths().distance(0, g.size() - 1);
        println!("Hops 0 -> {}: {}", g.size() - 1, far.map_or("unreachable".to_string(), |d| d.to_string()));
    }
    Ok(g)
}

/// Run the three-node relay example:
///
/// ```text
/// t=0  0 meets 1
/// t=1  1 meets 2
/// A message leaving 0 at t=0 reaches 2 at t=2.
/// Leaving 0 at t=1 is too late: the only contact of 0 has passed.
/// ```
pub fn run_relay_scenario() -> TemporalGraph {
    info!("=== Running Relay Scenario ===");
    let g = TemporalGraph::from_contacts("relay", 3, false, &[(0, 1, 0), (1, 2, 1)]);
    println!("{}", g.describe(false));

    for t in 0..g.t() {
        match g.latency(0, 2, t) {
            Some(latency) => println!("  depart 0 at t={t}: reach 2 after {latency} steps"),
            None => println!("  depart 0 at t={t}: 2 is unreachable"),
        }
    }
    println!("\n--- Path records 0 -> 2 ---");
    for rec in g.path_records(0, 2) {
        println!("  {rec}");
    }
    println!("  average latency: {:.2}", g.average_latency(0, 2));
    g
}

/// Outcome of the rollback walkthrough
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollbackOutcome {
    pub edits: usize,
    pub edges_before: usize,
    pub edges_after_edits: usize,
    pub edges_after_reset: usize,
    pub restored: bool,
}

/// Apply random edits to a small world under history recording, then roll
/// them all back
pub fn run_rollback_scenario(seed: u64, edits: usize) -> Result<RollbackOutcome> {
    info!("=== Running Rollback Scenario ===");
    let mut rng = StdRng::seed_from_u64(seed);
    let mut g = GraphBuilder::new(30)
        .small_world(4, 0.1, &mut rng)
        .context("Failed to build small world")?;
    let before: Vec<_> = g.edges().collect();
    let edges_before = g.edges_count();

    g.start_recording_history();
    for _ in 0..edits {
        let i = rng.random_range(0..g.size());
        let j = rng.random_range(0..g.size());
        g.swap_edge(i, j);
    }
    let recorded = g.history_size();
    let edges_after_edits = g.edges_count();
    println!("  {recorded} recorded edits, {edges_before} -> {edges_after_edits} edges");

    g.reset_graph();
    let mut after: Vec<_> = g.edges().collect();
    after.sort();
    let mut expected = before;
    expected.sort();
    let restored = after == expected;
    println!("  reset: {} edges, original restored: {restored}", g.edges_count());

    Ok(RollbackOutcome {
        edits: recorded,
        edges_before,
        edges_after_edits,
        edges_after_reset: g.edges_count(),
        restored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Topology;

    #[test]
    fn test_relay_scenario_latencies() {
        let g = run_relay_scenario();
        assert_eq!(g.latency(0, 2, 0), Some(2));
        assert_eq!(g.latency(0, 2, 1), None);
    }

    #[test]
    fn test_latency_survey_on_clique() {
        let config = ScenarioConfig {
            topology: Topology::Clique,
            nodes: 8,
            sampled_pairs: 30,
            ..ScenarioConfig::default()
        };
        let report = run_latency_survey(&config).unwrap();
        assert_eq!(report.nodes, 8);
        assert!(report.edges <= 28);
        assert!((0.0..=1.0).contains(&report.reachable_fraction));
        assert_eq!(report.sampled_pairs, 30);
        assert!(report.sampled_reachable <= 30);
        if let Some(mean) = report.mean_average_latency {
            assert!(mean >= 1.0);
        }
    }

    #[test]
    fn test_survey_is_reproducible() {
        let config = ScenarioConfig {
            nodes: 20,
            ..ScenarioConfig::default()
        };
        let a = run_latency_survey(&config).unwrap();
        let b = run_latency_survey(&config).unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn test_survey_rejects_bad_degree() {
        let config = ScenarioConfig {
            nodes: 4,
            avg_degree: 9,
            ..ScenarioConfig::default()
        };
        assert!(run_latency_survey(&config).is_err());
    }

    #[test]
    fn test_rollback_restores_graph() {
        let outcome = run_rollback_scenario(5, 200).unwrap();
        assert!(outcome.restored);
        // Self-loop swaps are rejected and never recorded
        assert!(outcome.edits > 150 && outcome.edits <= 200);
        assert_eq!(outcome.edges_after_reset, outcome.edges_before);
    }

    #[test]
    fn test_describe_builds_graph() {
        let config = ScenarioConfig {
            topology: Topology::Cycle,
            nodes: 6,
            ..ScenarioConfig::default()
        };
        let g = run_describe(&config).unwrap();
        assert_eq!(g.edges_count(), 6);
    }
}
