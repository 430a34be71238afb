//! Tunable constants and solver configuration.
//!
//! A plain struct with a validating constructor and a sensible `Default`.

use crate::error::ConfigError;

/// DP sentinel for "no finite expected value".
pub const INFINITE_SCORE: f64 = 1e9;

/// Default self-loop tolerance.
pub const EPSILON: f64 = 1e-9;

/// Configuration shared by the solver and heat map.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Total candidate-aim count `N`; the grid is `k x k` with
    /// `k = floor(sqrt(N))`.
    pub sample_count: usize,
    /// Self-loop tolerance `epsilon`.
    pub epsilon: f64,
    /// DP sentinel value for unwinnable states.
    pub infinite_score: f64,
    /// Default Monte-Carlo integration sample count.
    pub mc_samples: usize,
    /// Deterministic RNG seed; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            sample_count: 2_500,
            epsilon: EPSILON,
            infinite_score: INFINITE_SCORE,
            mc_samples: 10_000,
            rng_seed: None,
        }
    }
}

impl SolverConfig {
    /// Construct a configuration, validating positivity of the sample
    /// counts.
    pub fn new(sample_count: usize, mc_samples: usize) -> Result<Self, ConfigError> {
        if sample_count == 0 {
            return Err(ConfigError::NonPositiveSampleCount(0));
        }
        if mc_samples == 0 {
            return Err(ConfigError::NonPositiveSampleCount(0));
        }
        Ok(Self {
            sample_count,
            mc_samples,
            ..Self::default()
        })
    }

    /// Grid side length `k = floor(sqrt(sample_count))`.
    pub fn grid_side(&self) -> usize {
        (self.sample_count as f64).sqrt().floor() as usize
    }
}
