//! # Tempnet Simulation
//!
//! Scenario runner for the tempnet graph substrate.
//!
//! ## Architecture
//!
//! - **Config** (`config.rs`): Scenario parameters, loadable from JSON
//! - **Scenarios** (`scenarios.rs`): Pre-built runs over static and temporal graphs
//!
//! ## Example: Latency Survey
//!
//! ```rust,ignore
//! use tempnet_simulation::*;
//!
//! let config = ScenarioConfig {
//!     topology: Topology::BarabasiAlbert,
//!     nodes: 100,
//!     ..Default::default()
//! };
//!
//! let report = run_latency_survey(&config)?;
//! println!("{:.1}% of pairs reachable", 100.0 * report.reachable_fraction);
//! ```

pub mod config;
pub mod scenarios;

// Re-export main types
pub use config::{ScenarioConfig, Topology};

pub use scenarios::{
    LatencyReport,
    RollbackOutcome,
    run_describe,
    run_latency_survey,
    run_relay_scenario,
    run_rollback_scenario,
};
