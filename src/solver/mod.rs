//! Candidate-aim grid generation and the two solver strategies: a
//! memoized minimum-expected-throws DP and a myopic maximum-expected-
//! points greedy evaluator.
//!
//! The memoization table is a per-state cache populated on demand; the
//! per-aim grid fill (reused by `crate::heatmap`) runs in parallel.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::config::SolverConfig;
use crate::game::{Game, GameVariant, State};
use crate::geometry::Vec2;

/// A uniform `k x k` grid of candidate aim points over a game's bounds,
/// with `k = floor(sqrt(sample_count))`. Aims are enumerated in
/// row-major order, row 0 at the bottom (grid space, not screen space —
/// `crate::heatmap` flips the row convention for rendering).
pub struct AimGrid {
    aims: Vec<Vec2>,
    side: usize,
}

impl AimGrid {
    pub fn new(game: &Game, config: &SolverConfig) -> Self {
        let bounds = game.bounds();
        let side = config.grid_side().max(1);
        let mut aims = Vec::with_capacity(side * side);
        for row in 0..side {
            for col in 0..side {
                let u = (col as f64 + 0.5) / side as f64;
                let v = (row as f64 + 0.5) / side as f64;
                aims.push(Vec2::new(
                    bounds.min.x + u * bounds.width(),
                    bounds.min.y + v * bounds.height(),
                ));
            }
        }
        Self { aims, side }
    }

    pub fn aims(&self) -> &[Vec2] {
        &self.aims
    }

    pub fn side(&self) -> usize {
        self.side
    }
}

/// Minimum-expected-throws dynamic program with memoization and
/// winnability propagation.
///
/// The memo and winnability set are `Mutex`-guarded (one lock per
/// cache) rather than `RefCell`-guarded, so a `DpSolver` stays `Sync`
/// and can be shared across threads — in particular by
/// `crate::heatmap::HeatMap`, whose per-cell `solve_aim` calls run on a
/// rayon thread pool.
pub struct DpSolver<'a> {
    game: &'a Game<'a>,
    config: SolverConfig,
    memo: Mutex<HashMap<State, (f64, Vec2)>>,
    winnable: Mutex<HashSet<State>>,
}

impl<'a> DpSolver<'a> {
    pub fn new(game: &'a Game<'a>, config: SolverConfig) -> Self {
        Self {
            game,
            config,
            memo: Mutex::new(HashMap::new()),
            winnable: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn game(&self) -> &Game<'a> {
        self.game
    }

    /// `(expected_throws, optimal_aim)` for `state`, memoized.
    pub fn solve(&self, state: State) -> (f64, Vec2) {
        if let Some(cached) = self.memo.lock().expect("memo mutex poisoned").get(&state) {
            return *cached;
        }

        if state == 0 {
            let result = (0.0, Vec2::ZERO);
            self.memo.lock().expect("memo mutex poisoned").insert(0, result);
            self.winnable.lock().expect("winnable mutex poisoned").insert(0);
            return result;
        }

        let grid = AimGrid::new(self.game, &self.config);
        let mut best = (self.config.infinite_score, grid.aims().first().copied().unwrap_or(Vec2::ZERO));
        let mut any_finite = false;

        for &aim in grid.aims() {
            let value = self.expected_value_for_aim(state, aim);
            if value < best.0 {
                best = (value, aim);
            }
            if value < self.config.infinite_score {
                any_finite = true;
            }
        }

        if any_finite {
            self.winnable.lock().expect("winnable mutex poisoned").insert(state);
        }
        self.memo.lock().expect("memo mutex poisoned").insert(state, best);
        best
    }

    /// The DP value `E_a` of aiming at `aim` from `state`: the closed-
    /// form expected hitting time under the geometric self-loop fold.
    pub fn solve_aim(&self, state: State, aim: Vec2) -> f64 {
        self.expected_value_for_aim(state, aim)
    }

    fn expected_value_for_aim(&self, state: State, aim: Vec2) -> f64 {
        let transitions = self.game.state_transitions(state, aim);

        let mut p_self = 0.0;
        let mut weighted_future = 0.0;
        for &(next, p) in transitions.entries() {
            if next == state {
                p_self += p;
                continue;
            }
            if !self.is_winnable(next) {
                p_self += p;
                continue;
            }
            let (value, _) = self.solve(next);
            weighted_future += p * value;
        }

        if p_self >= 1.0 - self.config.epsilon {
            return self.config.infinite_score;
        }

        (1.0 + weighted_future) / (1.0 - p_self)
    }

    /// Whether `state` has at least one aim with a finite expected
    /// value, per the current memo. Recurses through `solve` so that
    /// unevaluated ancestors are computed on demand, matching the
    /// strictly-decreasing-state recursion the DP relies on.
    fn is_winnable(&self, state: State) -> bool {
        if state == 0 {
            return true;
        }
        if self.winnable.lock().expect("winnable mutex poisoned").contains(&state) {
            return true;
        }
        if self.memo.lock().expect("memo mutex poisoned").contains_key(&state) {
            // already evaluated and not winnable
            return false;
        }
        self.solve(state);
        self.winnable.lock().expect("winnable mutex poisoned").contains(&state)
    }
}

/// Myopic maximum-expected-points solver: a single-step evaluation with
/// no memoization or recursion. The finish rule is whatever `game` was
/// built with; there is no separate variant to pass here.
pub struct GreedySolver<'a> {
    game: &'a Game<'a>,
    config: SolverConfig,
}

impl<'a> GreedySolver<'a> {
    pub fn new(game: &'a Game<'a>, config: SolverConfig) -> Self {
        Self { game, config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn game(&self) -> &Game<'a> {
        self.game
    }

    /// `(expected_points, best_aim)` for `state`: the aim maximizing
    /// expected single-throw score reduction.
    pub fn solve(&self, state: State) -> (f64, Vec2) {
        let grid = AimGrid::new(self.game, &self.config);
        let mut best = (f64::NEG_INFINITY, Vec2::ZERO);
        for &aim in grid.aims() {
            let value = self.solve_aim(state, aim);
            if value > best.0 {
                best = (value, aim);
            }
        }
        best
    }

    /// Expected score reduction `sum_hit (s - s') * p_hit` for `aim`,
    /// under `game`'s own transitions — a non-finishing hit under
    /// `FinishOnDouble` busts back to `s' = s` and so contributes zero,
    /// same as it does for the DP solver.
    pub fn solve_aim(&self, state: State, aim: Vec2) -> f64 {
        let transitions = self.game.state_transitions(state, aim);
        let signed_state = state as i64;
        transitions
            .entries()
            .iter()
            .map(|&(next, p)| (signed_state - next as i64) as f64 * p)
            .sum()
    }
}
