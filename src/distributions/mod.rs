//! Two-dimensional probability distributions over the aim plane.
//!
//! A planar distribution exposes four capabilities: density evaluation,
//! random sampling, and two polygon-integration variants.

mod normal;

pub use normal::{BivariateNormal, IntegrationMode};

use crate::error::ConfigError;
use crate::geometry::{Polygon, Vec2};

/// A 2D probability law over the aim plane.
///
/// Requires `Sync` so a `Game`/`Solver` borrowing a `dyn Distribution2D`
/// can itself be shared across threads: implementations are free to
/// parallelize independent aim evaluations, but any internal
/// pseudorandom generator must be guarded by the implementor, not left
/// to the caller.
pub trait Distribution2D: Sync {
    /// Probability density at `p`.
    fn density(&self, p: Vec2) -> f64;

    /// Draw a random sample. May carry internal mutable state (a seeded
    /// PRNG); the observable density is constant regardless.
    fn sample(&self) -> Vec2;

    /// Probability mass over `region`.
    fn integrate(&self, region: &Polygon) -> f64;

    /// Probability that `sample() + offset` lands in `region`, equivalently
    /// the integral of the density translated by `offset` over `region`.
    /// This is the convention the game layer uses: the bed is fixed, the
    /// aim point translates the distribution.
    fn integrate_offset(&self, region: &Polygon, offset: Vec2) -> f64;

    /// Append a calibration sample and recompute parameters from the
    /// accumulated set. Errors if too few points remain to estimate a
    /// distribution.
    fn add_point(&mut self, p: Vec2) -> Result<(), ConfigError>;
}
