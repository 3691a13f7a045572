//! Error types for the graph substrate
//!
//! Most invalid operations on a graph are not errors: adding a self-loop or
//! a duplicate edge simply returns `false`. The variants here cover inputs
//! that must be rejected before they reach any cached state.

use thiserror::Error;

use crate::temporal::Time;

/// Errors raised by graph construction and temporal mutation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Time range whose start lies after its end
    #[error("Invalid time interval [{begin}, {end}]: begin exceeds end")]
    InvalidInterval { begin: Time, end: Time },

    /// Time point past the last one a horizon can cover
    #[error("Time point {time} exceeds the largest contact time {limit}")]
    TimeOutOfRange { time: Time, limit: Time },

    /// Node index not below the graph size
    #[error("Node {node} out of range for graph of size {size}")]
    NodeOutOfRange { node: usize, size: usize },

    /// Generator or transform argument outside its domain
    #[error("Invalid generator parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;
