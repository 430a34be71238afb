//! Error taxonomy for configuration-time and runtime-range failures.
//!
//! Numerical edge conditions (probabilities a hair outside `[0, 1]`, a
//! self-loop probability approaching 1) are never represented as errors:
//! they are clamped, or encoded via `config::INFINITE_SCORE`, in the
//! ordinary return value.

use thiserror::Error;

/// Failures that can only happen at construction time.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("target has no beds")]
    EmptyTarget,

    #[error("bed {index} has a degenerate shape (fewer than 3 vertices)")]
    DegenerateBed { index: usize },

    #[error("covariance matrix is not positive definite")]
    NonPositiveDefiniteCovariance,

    #[error("sample count must be positive, got {0}")]
    NonPositiveSampleCount(i64),

    #[error("grid dimension must be positive, got {0}")]
    NonPositiveGridDimension(i64),

    #[error("need at least 2 calibration points to estimate a distribution, have {have}")]
    InsufficientCalibrationPoints { have: usize, need: usize },
}

/// Failures from handing the core an out-of-range runtime argument.
#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("state must be non-negative, got {value}")]
    NegativeState { value: i64 },
}
