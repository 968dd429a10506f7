//! Tunable parameters for the learner and predictor, with the Python
//! reference's literal defaults preserved.

use serde::{Deserialize, Serialize};

/// Parameters for [`crate::learn::learn`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnConfig {
    /// Monte-Carlo samples per confidence estimate.
    pub sample_size: usize,
    /// Saturation threshold that triggers path-length growth.
    pub sat: f64,
    /// Wall-clock seconds per sampling span.
    pub ts: f64,
    /// Laplace smoothing constant.
    pub pc: f64,
    /// Total wall-clock budget for the whole learning run, in seconds.
    pub max_total_time: f64,
    /// Minimum head-grounding count a rule must reach to be kept
    /// (spec's default quality predicate).
    pub min_head_groundings: usize,
    /// Alternate between cyclic-only and unrestricted sampling at `n == 3`.
    pub alternate_cyclic_sampling: bool,
    /// Allow walks to traverse edges in either direction.
    pub temporal_window: bool,
}

impl Default for LearnConfig {
    fn default() -> Self {
        Self {
            sample_size: 500,
            sat: 0.99,
            ts: 1.0,
            pc: 5.0,
            max_total_time: 60.0,
            min_head_groundings: 2,
            alternate_cyclic_sampling: true,
            temporal_window: false,
        }
    }
}

/// Parameters for [`crate::predict::Predictor`] queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictConfig {
    /// Number of ranked candidates to return.
    pub k: usize,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self { k: 10 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learn_config_defaults_match_reference_implementation() {
        let config = LearnConfig::default();
        assert_eq!(config.sample_size, 500);
        assert_eq!(config.sat, 0.99);
        assert_eq!(config.ts, 1.0);
        assert_eq!(config.pc, 5.0);
    }

    #[test]
    fn predict_config_round_trips_through_toml() {
        let config = PredictConfig { k: 25 };
        let serialized = toml::to_string(&config).unwrap();
        let parsed: PredictConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed, config);
    }
}
