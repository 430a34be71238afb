//! Optimal dartboard aiming solver.
//!
//! Given a polygonal target whose beds carry signed score deltas and hit
//! types, and a 2D distribution modeling a player's aim dispersion, this
//! crate computes the aim point minimizing expected throws to finish (or
//! maximizing expected single-throw score) for any game state, plus a
//! dense per-cell heat map over every candidate aim.
//!
//! Layered bottom-up: `geometry` and `quadrature` are leaves; `distributions`
//! builds on both; `target` is independent data; `game` combines a `target`
//! and a `distributions::Distribution2D`; `solver` borrows a `game`; `heatmap`
//! borrows a `solver`.

pub mod config;
pub mod distributions;
pub mod error;
pub mod game;
pub mod geometry;
pub mod heatmap;
pub mod quadrature;
pub mod solver;
pub mod target;

pub use config::{SolverConfig, EPSILON, INFINITE_SCORE};
pub use distributions::{BivariateNormal, Distribution2D, IntegrationMode};
pub use error::{ConfigError, StateError};
pub use game::{checked_state, Game, GameVariant, HitDistribution, State, StateDistribution};
pub use geometry::{triangle_area, Bounds, Polygon, Vec2};
pub use heatmap::{AimSolver, Grid, HeatMap};
pub use solver::{AimGrid, DpSolver, GreedySolver};
pub use target::{Bed, HitData, HitType, Target};
