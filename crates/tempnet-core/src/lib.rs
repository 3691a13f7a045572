//! # Tempnet Core
//!
//! Graph substrate for spread experiments on static and time-varying
//! networks.
//!
//! ## Core Components
//!
//! - [`Coalition`]: Set of node indices with O(1) membership, uniform random
//!   draws and set algebra
//! - [`Graph`]: Directed or undirected graph with edit history, change
//!   notification, connectivity queries and a cached distance oracle
//! - [`TemporalGraph`]: Graph whose edges carry a [`Timeline`] of active
//!   time points, with time-sliced neighbour queries
//! - [`Search`]: Breadth- and depth-first traversal reporting to a
//!   [`SearchVisitor`]
//! - [`LatencyTable`]: All-pairs fastest temporal paths, kept fresh by the
//!   [`Latency`] cache subscribed to a temporal graph
//!
//! ## Edit History
//!
//! Both graph kinds can record their mutations and roll them back, either
//! all at once (one `Reset` notification) or a few at a time (one
//! notification per undone edit).
//!
//! ## Example
//!
//! ```rust
//! use tempnet_core::TemporalGraph;
//!
//! // 0 meets 1 at t=0, then 1 meets 2 at t=1
//! let g = TemporalGraph::from_contacts("relay", 3, false, &[(0, 1, 0), (1, 2, 1)]);
//!
//! assert_eq!(g.latency(0, 2, 0), Some(2));
//! assert_eq!(g.latency(0, 2, 1), None);
//! ```

pub mod coalition;
mod connectivity;
pub mod edge;
pub mod error;
pub mod generator;
pub mod graph;
mod history;
pub mod listener;
mod sampling;
pub mod search;
pub mod shortest_paths;
pub mod temporal;

// Re-export main types
pub use coalition::Coalition;
pub use edge::{Edge, PossibleEdges};
pub use error::{GraphError, GraphResult};
pub use generator::GraphBuilder;
pub use graph::Graph;
pub use listener::{ChangeLog, GraphChange, GraphListener};
pub use search::{Search, SearchVisitor};
pub use shortest_paths::ShortestPaths;
pub use temporal::{ContactConfig, Latency, LatencyTable, MAX_CONTACT_TIME, PathRec, TemporalGraph, Time, Timeline};
