//! Scenario configuration
//!
//! A [`ScenarioConfig`] names the backbone model and its parameters plus the
//! contact generator settings. It loads from JSON with every field
//! optional; the CLI applies its flags on top.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};

use tempnet_core::temporal::generator::generate_contacts;
use tempnet_core::{ContactConfig, Graph, GraphBuilder, GraphResult, TemporalGraph};

/// Backbone graph model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    ErdosRenyi,
    BarabasiAlbert,
    SmallWorld,
    ScaleFree,
    Cycle,
    Clique,
    PruferTree,
}

/// Configuration for a scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Backbone model
    pub topology: Topology,
    /// Number of nodes
    pub nodes: usize,
    /// Target average degree for the random models
    pub avg_degree: usize,
    /// Rewiring probability for the small-world model
    pub beta: f64,
    /// Power-law exponent of the scale-free degree sequence
    pub alpha: f64,
    /// Build directed graphs
    pub directed: bool,
    /// Seed for every random draw of the run
    pub seed: u64,
    /// Contact generator settings for temporal runs
    pub contacts: ContactConfig,
    /// Node pairs sampled for latency statistics
    pub sampled_pairs: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            topology: Topology::ErdosRenyi,
            nodes: 50,
            avg_degree: 4,
            beta: 0.1,
            alpha: 2.5,
            directed: false,
            seed: 42,
            contacts: ContactConfig::default(),
            sampled_pairs: 200,
        }
    }
}

impl ScenarioConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Scenario config not found: {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid scenario config: {}", path.display()))
    }

    /// Static backbone described by this configuration
    pub fn build_graph<R: Rng + ?Sized>(&self, rng: &mut R) -> GraphResult<Graph> {
        let builder = GraphBuilder::new(self.nodes).directed(self.directed);
        match self.topology {
            Topology::ErdosRenyi => builder.erdos_renyi(self.avg_degree, rng),
            Topology::BarabasiAlbert => builder.barabasi_albert(self.avg_degree, rng),
            Topology::SmallWorld => builder.small_world(self.avg_degree, self.beta, rng),
            Topology::ScaleFree => {
                let k_max = self.nodes.saturating_sub(1);
                builder.scale_free_configuration(self.alpha, 1, k_max, rng)
            }
            Topology::Cycle => Ok(builder.cycle()),
            Topology::Clique => Ok(builder.clique()),
            Topology::PruferTree => builder.prufer_tree(rng),
        }
    }

    /// Backbone with generated contacts on every edge
    pub fn build_temporal<R: Rng + ?Sized>(&self, rng: &mut R) -> GraphResult<TemporalGraph> {
        let backbone = self.build_graph(rng)?;
        let name = format!("t{}", backbone.name());
        generate_contacts(name, &backbone, &self.contacts, rng)
    }
}
