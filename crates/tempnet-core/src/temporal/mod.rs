//! Time-varying graphs and fastest temporal paths

pub mod generator;
mod graph;
mod latency;
mod timeline;

pub use generator::ContactConfig;
pub use graph::TemporalGraph;
pub use latency::{Latency, LatencyTable, PathRec};
pub use timeline::Timeline;

/// Discrete time point
pub type Time = u32;

/// Largest time point a contact may use, so that the horizon `T` still fits
pub const MAX_CONTACT_TIME: Time = Time::MAX - 1;
