//! Random contact sequences over static backbones
//!
//! Contacts are laid out as one long sequence whose gaps follow a truncated
//! power law `P(gap = x) ~ x^-coeff` on `[interval_min, interval_max]`. The
//! sequence is cut into equal periods, one per backbone edge, and each
//! period is squeezed into a window of `overlap * max_time` placed at a
//! random offset of the horizon. With `overlap = 1` all edges share the
//! whole horizon; smaller values stagger edge activity.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use super::{TemporalGraph, Time};
use crate::error::{GraphError, GraphResult};
use crate::generator::GraphBuilder;
use crate::graph::Graph;

/// Parameters of the contact generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Upper bound (exclusive) of generated time points
    pub max_time: Time,
    /// Mean number of contacts per backbone edge
    pub avg_contacts_per_edge: usize,
    /// Fraction of the horizon each edge is active over
    pub overlap: f64,
    /// Smallest gap between consecutive contacts
    pub interval_min: u32,
    /// Largest gap between consecutive contacts
    pub interval_max: u32,
    /// Power-law exponent of the gap distribution
    pub interval_coeff: f64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            max_time: 100,
            avg_contacts_per_edge: 5,
            overlap: 0.5,
            interval_min: 1,
            interval_max: 10_000,
            interval_coeff: 2.0,
        }
    }
}

impl ContactConfig {
    pub fn validate(&self) -> GraphResult<()> {
        let invalid = |msg: String| Err(GraphError::InvalidParameter(msg));
        if self.max_time == 0 {
            return invalid("max_time must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.overlap) {
            return invalid(format!("overlap {} outside [0, 1]", self.overlap));
        }
        if self.interval_min == 0 || self.interval_min > self.interval_max {
            return invalid(format!(
                "gap range [{}, {}] must be positive and ordered",
                self.interval_min, self.interval_max
            ));
        }
        if !self.interval_coeff.is_finite() {
            return invalid(format!("gap exponent {} is not finite", self.interval_coeff));
        }
        Ok(())
    }

    /// Name suffix identifying these parameters; gap settings appear only
    /// when they differ from the defaults
    fn name_suffix(&self) -> String {
        let mut suffix = format!(
            "-{}-{}-{}",
            self.max_time,
            self.avg_contacts_per_edge,
            (self.overlap * 100.0) as u32
        );
        let defaults = Self::default();
        if (self.interval_min, self.interval_max, self.interval_coeff)
            != (defaults.interval_min, defaults.interval_max, defaults.interval_coeff)
        {
            suffix.push_str(&format!(
                "-{}-{}-{}",
                self.interval_min, self.interval_max, self.interval_coeff
            ));
        }
        suffix
    }
}

/// Spread random contacts over the edges of `backbone`
pub fn generate_contacts<R: Rng + ?Sized>(
    name: impl Into<String>,
    backbone: &Graph,
    config: &ContactConfig,
    rng: &mut R,
) -> GraphResult<TemporalGraph> {
    config.validate()?;
    let mut res = TemporalGraph::new(name, backbone.size(), backbone.is_directed());
    let m = backbone.edges_count();
    if m == 0 || config.avg_contacts_per_edge == 0 {
        return Ok(res);
    }

    let gaps: Vec<u32> = (config.interval_min..=config.interval_max).collect();
    let weights = gaps.iter().map(|&x| (x as f64).powf(-config.interval_coeff));
    let dist = WeightedIndex::new(weights)
        .map_err(|e| GraphError::InvalidParameter(format!("gap distribution: {e}")))?;

    let mut contacts = Vec::with_capacity(config.avg_contacts_per_edge * m);
    let mut clock = 0u64;
    for k in 0..config.avg_contacts_per_edge * m {
        if k > 0 {
            clock += gaps[dist.sample(rng)] as u64;
        }
        contacts.push(clock);
    }
    let period = (clock + gaps[dist.sample(rng)] as u64) as f64 / m as f64;

    let max_time = config.max_time as f64;
    let window = config.overlap * max_time;
    let mut next = contacts.iter().peekable();
    let mut lower = 0.0;
    for e in backbone.edges() {
        let begin = rng.random::<f64>() * (1.0 - config.overlap) * max_time;
        while let Some(&&c) = next.peek() {
            if c as f64 >= lower + period {
                break;
            }
            next.next();
            let t = (begin + window * ((c as f64 - lower) / period)) as Time;
            res.add_t_edge(e.i(), e.j(), t);
        }
        lower += period;
    }
    Ok(res)
}

/// Contacts over an Erdős–Rényi backbone
pub fn erdos_renyi<R: Rng + ?Sized>(
    n: usize,
    avg_degree: usize,
    config: &ContactConfig,
    rng: &mut R,
) -> GraphResult<TemporalGraph> {
    let backbone = GraphBuilder::new(n).erdos_renyi(avg_degree, rng)?;
    let name = format!("ter-{n}-{avg_degree}{}", config.name_suffix());
    generate_contacts(name, &backbone, config, rng)
}

/// Contacts over a Barabási–Albert backbone
pub fn barabasi_albert<R: Rng + ?Sized>(
    n: usize,
    avg_degree: usize,
    config: &ContactConfig,
    rng: &mut R,
) -> GraphResult<TemporalGraph> {
    let backbone = GraphBuilder::new(n).barabasi_albert(avg_degree, rng)?;
    let name = format!("tba-{n}-{avg_degree}{}", config.name_suffix());
    generate_contacts(name, &backbone, config, rng)
}

/// Contacts over a Watts–Strogatz backbone
pub fn small_world<R: Rng + ?Sized>(
    n: usize,
    avg_degree: usize,
    beta: f64,
    config: &ContactConfig,
    rng: &mut R,
) -> GraphResult<TemporalGraph> {
    let backbone = GraphBuilder::new(n).small_world(avg_degree, beta, rng)?;
    let name = format!("tws-{n}-{avg_degree}{}", config.name_suffix());
    generate_contacts(name, &backbone, config, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_contacts_stay_within_horizon() {
        let mut rng = StdRng::seed_from_u64(17);
        let config = ContactConfig::default();
        let g = erdos_renyi(30, 4, &config, &mut rng).unwrap();
        assert!(g.max_time() < config.max_time);
        assert!(g.contacts_count() > 0);
        assert!(g.contacts_count() <= config.avg_contacts_per_edge * 200);
        assert_eq!(g.name(), "ter-30-4-100-5-50");
    }

    #[test]
    fn test_edges_only_from_backbone() {
        let mut rng = StdRng::seed_from_u64(2);
        let backbone = GraphBuilder::new(10).cycle();
        let config = ContactConfig {
            avg_contacts_per_edge: 20,
            overlap: 1.0,
            ..ContactConfig::default()
        };
        let g = generate_contacts("c", &backbone, &config, &mut rng).unwrap();
        assert!(g.edges().all(|e| backbone.contains_edge(e.i(), e.j())));
        assert!(g.timelines().all(|(_, tl)| !tl.is_empty()));
    }

    #[test]
    fn test_custom_gaps_in_name() {
        let config = ContactConfig {
            interval_max: 50,
            ..ContactConfig::default()
        };
        assert_eq!(config.name_suffix(), "-100-5-50-1-50-2");
        let mut rng = StdRng::seed_from_u64(5);
        let g = small_world(12, 4, 0.1, &config, &mut rng).unwrap();
        assert!(g.name().starts_with("tws-12-4-"));
    }

    #[test]
    fn test_invalid_config() {
        let mut rng = StdRng::seed_from_u64(0);
        let backbone = GraphBuilder::new(4).cycle();
        let bad_overlap = ContactConfig {
            overlap: 1.2,
            ..ContactConfig::default()
        };
        assert!(generate_contacts("x", &backbone, &bad_overlap, &mut rng).is_err());
        let bad_gaps = ContactConfig {
            interval_min: 10,
            interval_max: 5,
            ..ContactConfig::default()
        };
        assert!(bad_gaps.validate().is_err());
    }

    #[test]
    fn test_empty_backbone() {
        let mut rng = StdRng::seed_from_u64(0);
        let g = generate_contacts("e", &Graph::new("e", 5, false), &ContactConfig::default(), &mut rng).unwrap();
        assert_eq!(g.contacts_count(), 0);
        assert_eq!(g.t(), 1);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: ContactConfig = serde_json::from_str(r#"{"max_time": 40, "overlap": 0.25}"#).unwrap();
        assert_eq!(config.max_time, 40);
        assert_eq!(config.overlap, 0.25);
        assert_eq!(config.interval_max, 10_000);
    }
}
