//! Dense per-cell evaluation of a solver's aim value over a rectangular
//! grid, cached per game state.
//!
//! Row-major grid shape with a CSV export convention, over an arbitrary
//! solver's aim plane.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;

use rayon::prelude::*;

use crate::error::ConfigError;
use crate::game::State;
use crate::geometry::Vec2;

/// Anything that can evaluate a single aim point for a state. Implemented
/// by both `crate::solver::DpSolver` and `crate::solver::GreedySolver`;
/// a trait rather than an enum here because the heat map itself does not
/// care which concrete strategy it is rendering.
pub trait AimSolver {
    fn solve_aim(&self, state: State, aim: Vec2) -> f64;
    fn bounds(&self) -> crate::geometry::Bounds;
}

impl<'a> AimSolver for crate::solver::DpSolver<'a> {
    fn solve_aim(&self, state: State, aim: Vec2) -> f64 {
        crate::solver::DpSolver::solve_aim(self, state, aim)
    }
    fn bounds(&self) -> crate::geometry::Bounds {
        self.game().bounds()
    }
}

impl<'a> AimSolver for crate::solver::GreedySolver<'a> {
    fn solve_aim(&self, state: State, aim: Vec2) -> f64 {
        crate::solver::GreedySolver::solve_aim(self, state, aim)
    }
    fn bounds(&self) -> crate::geometry::Bounds {
        self.game().bounds()
    }
}

/// A dense `rows x cols` grid of solver values for one state.
#[derive(Debug, Clone)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<f64>,
}

impl Grid {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }
}

/// Borrows a solver and owns a per-state cache of evaluated grids.
pub struct HeatMap<'a, S: AimSolver> {
    solver: &'a S,
    cache: RefCell<HashMap<State, Grid>>,
}

impl<'a, S: AimSolver + Sync> HeatMap<'a, S> {
    pub fn new(solver: &'a S) -> Self {
        Self {
            solver,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Evaluate (or return the cached) `rows x cols` grid for `state`.
    /// Cell `(r, c)`'s aim: row `0` is the top of the bounding box, so
    /// `r` runs opposite to the `y` axis.
    ///
    /// Fails with `ConfigError::NonPositiveGridDimension` if `rows` or
    /// `cols` is zero rather than silently returning an empty grid.
    pub fn heat_map(&self, state: State, rows: usize, cols: usize) -> Result<Grid, ConfigError> {
        if rows == 0 {
            return Err(ConfigError::NonPositiveGridDimension(rows as i64));
        }
        if cols == 0 {
            return Err(ConfigError::NonPositiveGridDimension(cols as i64));
        }

        if let Some(cached) = self.cache.borrow().get(&state) {
            if cached.rows == rows && cached.cols == cols {
                return Ok(cached.clone());
            }
        }

        let bounds = self.solver.bounds();
        let width = bounds.width();
        let height = bounds.height();

        let mut cells = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                cells.push((r, c));
            }
        }

        let values: Vec<f64> = cells
            .into_par_iter()
            .map(|(r, c)| {
                let u = (c as f64 + 0.5) / cols as f64;
                let v = (rows as f64 - r as f64 - 0.5) / rows as f64;
                let aim = Vec2::new(bounds.min.x + u * width, bounds.min.y + v * height);
                self.solver.solve_aim(state, aim)
            })
            .collect();

        let grid = Grid { rows, cols, values };
        self.cache.borrow_mut().insert(state, grid.clone());
        Ok(grid)
    }
}

/// Write a grid to `writer` as CSV: one row per grid row, one column per
/// cell. Generalizes `analytics::export::export_heatmap_csv`'s handicap
/// x distance table to an arbitrary solver-value grid.
pub fn write_heatmap_csv<W: Write>(grid: &Grid, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in 0..grid.rows {
        let row: Vec<String> = (0..grid.cols).map(|c| grid.get(r, c).to_string()).collect();
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::distributions::{BivariateNormal, IntegrationMode};
    use crate::game::{Game, GameVariant};
    use crate::geometry::Polygon;
    use crate::solver::DpSolver;
    use crate::target::{Bed, HitData, HitType, Target};
    use nalgebra::Matrix2;

    fn small_target() -> Target {
        let shape = Polygon::new(vec![
            Vec2::new(-5.0, -5.0),
            Vec2::new(5.0, -5.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(-5.0, 5.0),
        ]);
        Target::new(vec![Bed::new(shape, HitData::new(HitType::Normal, -20))]).unwrap()
    }

    #[test]
    fn heat_map_produces_full_grid_and_caches() {
        let target = small_target();
        let dist =
            BivariateNormal::with_mode(Vec2::ZERO, Matrix2::identity(), IntegrationMode::Quadrature).unwrap();
        let game = Game::new(&target, &dist, GameVariant::FinishOnAny);
        let config = SolverConfig::new(25, 100).unwrap();
        let solver = DpSolver::new(&game, config);
        let heatmap = HeatMap::new(&solver);

        let grid = heatmap.heat_map(20, 4, 5).unwrap();
        assert_eq!(grid.values.len(), 20);

        let again = heatmap.heat_map(20, 4, 5).unwrap();
        assert_eq!(grid.values, again.values);
    }

    #[test]
    fn heat_map_rejects_non_positive_dimensions() {
        let target = small_target();
        let dist =
            BivariateNormal::with_mode(Vec2::ZERO, Matrix2::identity(), IntegrationMode::Quadrature).unwrap();
        let game = Game::new(&target, &dist, GameVariant::FinishOnAny);
        let config = SolverConfig::new(25, 100).unwrap();
        let solver = DpSolver::new(&game, config);
        let heatmap = HeatMap::new(&solver);

        assert_eq!(
            heatmap.heat_map(20, 0, 5).unwrap_err(),
            ConfigError::NonPositiveGridDimension(0)
        );
        assert_eq!(
            heatmap.heat_map(20, 5, 0).unwrap_err(),
            ConfigError::NonPositiveGridDimension(0)
        );
    }

    #[test]
    fn csv_export_has_one_row_per_grid_row() {
        let target = small_target();
        let dist =
            BivariateNormal::with_mode(Vec2::ZERO, Matrix2::identity(), IntegrationMode::Quadrature).unwrap();
        let game = Game::new(&target, &dist, GameVariant::FinishOnAny);
        let config = SolverConfig::new(25, 100).unwrap();
        let solver = DpSolver::new(&game, config);
        let heatmap = HeatMap::new(&solver);
        let grid = heatmap.heat_map(20, 3, 2).unwrap();

        let mut buf = Vec::new();
        write_heatmap_csv(&grid, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
