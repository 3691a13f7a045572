//! Tempnet - graph substrate scenarios
//!
//! Builds static and temporal networks and reports on their structure and
//! temporal reachability.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tempnet_simulation::{ScenarioConfig, Topology, scenarios};

#[derive(Parser)]
#[command(
    name = "tempnet",
    about = "Static and temporal network scenarios",
    version
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON scenario configuration; flags override its fields
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by the topology-driven commands
#[derive(Args)]
struct Overrides {
    /// Backbone model
    #[arg(short, long, value_enum)]
    topology: Option<Topology>,

    /// Number of nodes
    #[arg(short, long)]
    nodes: Option<usize>,

    /// Target average degree
    #[arg(short = 'k', long)]
    degree: Option<usize>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Build a directed graph
    #[arg(short, long)]
    directed: bool,
}

impl Overrides {
    fn apply(self, config: &mut ScenarioConfig) {
        if let Some(topology) = self.topology {
            config.topology = topology;
        }
        if let Some(nodes) = self.nodes {
            config.nodes = nodes;
        }
        if let Some(degree) = self.degree {
            config.avg_degree = degree;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.directed |= self.directed;
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Describe a generated static topology
    Describe {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Survey temporal reachability of a generated contact network
    Latency {
        #[command(flatten)]
        overrides: Overrides,

        /// Horizon of generated contacts
        #[arg(long)]
        max_time: Option<u32>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the three-node relay example
    Relay,

    /// Record random edits on a small world and roll them back
    Rollback {
        /// Random seed
        #[arg(short, long, default_value = "7")]
        seed: u64,

        /// Number of edit attempts
        #[arg(short, long, default_value = "100")]
        edits: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let mut config = match &cli.config {
        Some(path) => ScenarioConfig::from_file(path)?,
        None => ScenarioConfig::default(),
    };

    match cli.command {
        Commands::Describe { overrides } => {
            overrides.apply(&mut config);
            scenarios::run_describe(&config)?;
        }
        Commands::Latency { overrides, max_time, json } => {
            overrides.apply(&mut config);
            if let Some(max_time) = max_time {
                config.contacts.max_time = max_time;
            }
            let report = scenarios::run_latency_survey(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report).context("Failed to encode report")?);
            } else {
                println!("Network:            {}", report.name);
                println!("Nodes / edges:      {} / {}", report.nodes, report.edges);
                println!("Contacts:           {} over T={}", report.contacts, report.horizon);
                println!("Reachable pairs:    {:.1}%", 100.0 * report.reachable_fraction);
                match report.mean_average_latency {
                    Some(mean) => println!(
                        "Mean avg latency:   {mean:.2} ({} of {} sampled pairs)",
                        report.sampled_reachable, report.sampled_pairs
                    ),
                    None => println!("Mean avg latency:   n/a (no sampled pair reachable)"),
                }
            }
        }
        Commands::Relay => {
            scenarios::run_relay_scenario();
        }
        Commands::Rollback { seed, edits } => {
            let outcome = scenarios::run_rollback_scenario(seed, edits)?;
            if !outcome.restored {
                anyhow::bail!("rollback left {} edges instead of {}", outcome.edges_after_reset, outcome.edges_before);
            }
        }
    }

    Ok(())
}
