//! The game layer: combines a target and a distribution into hit
//! distributions and state transitions under a chosen rule variant.
//!
//! The finish rule is a tagged enum rather than a trait object, since
//! only two variants will ever exist.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::distributions::Distribution2D;
use crate::error::StateError;
use crate::geometry::{Bounds, Vec2};
use crate::target::{HitData, Target};

/// The countdown score remaining. `0` means the game is won.
pub type State = u64;

/// Validate a caller-supplied (possibly negative) state before handing it
/// to a `Game`/`Solver` entry point. Internal recursion never needs this:
/// every state it derives is itself a `State`, which cannot go negative.
pub fn checked_state(raw: i64) -> Result<State, StateError> {
    if raw < 0 {
        return Err(StateError::NegativeState { value: raw });
    }
    Ok(raw as State)
}

/// A probability-weighted hit outcome sequence, ordered by `HitData`
/// (type then diff). Probabilities sum to 1 within tolerance; duplicate
/// keys are merged before construction.
#[derive(Debug, Clone, PartialEq)]
pub struct HitDistribution {
    entries: Vec<(HitData, f64)>,
}

impl HitDistribution {
    fn from_map(map: BTreeMap<HitData, f64>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }

    pub fn entries(&self) -> &[(HitData, f64)] {
        &self.entries
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, p)| p).sum()
    }
}

/// A probability-weighted successor-state sequence, ordered by `State`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDistribution {
    entries: Vec<(State, f64)>,
}

impl StateDistribution {
    fn from_map(map: BTreeMap<State, f64>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }

    pub fn entries(&self) -> &[(State, f64)] {
        &self.entries
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, p)| p).sum()
    }
}

/// Which rule governs the mapping from a hit outcome to a successor
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameVariant {
    /// Any hit that does not bust reduces the state; busts leave it
    /// unchanged.
    FinishOnAny,
    /// The winning throw must land exactly on zero via a `double`; any
    /// other path to (or past) zero busts.
    FinishOnDouble,
}

impl GameVariant {
    /// Map a `(state, hit)` pair to its successor state under this
    /// variant's rule.
    pub fn transition(&self, state: State, hit: HitData) -> State {
        let signed_state = state as i64;
        let next = signed_state + hit.diff;
        match self {
            GameVariant::FinishOnAny => {
                if next < 0 {
                    state
                } else {
                    next as State
                }
            }
            GameVariant::FinishOnDouble => {
                use crate::target::HitType;
                if next == 0 {
                    if hit.hit_type == HitType::Double {
                        0
                    } else {
                        state
                    }
                } else if next < 0 {
                    state
                } else {
                    next as State
                }
            }
        }
    }
}

/// Combines a target and a distribution. Borrows both for its entire
/// lifetime; owns the `aim -> hit
/// distribution` cache.
///
/// Caches are `Mutex`-guarded (one lock per cache) rather than
/// `RefCell`-guarded so a `Game` — and the solvers that borrow it — can
/// be shared across threads for parallel aim evaluation.
pub struct Game<'a> {
    target: &'a Target,
    distribution: &'a dyn Distribution2D,
    variant: GameVariant,
    hit_cache: Mutex<std::collections::HashMap<Vec2, HitDistribution>>,
    bounds: Mutex<Option<Bounds>>,
}

impl<'a> Game<'a> {
    pub fn new(target: &'a Target, distribution: &'a dyn Distribution2D, variant: GameVariant) -> Self {
        Self {
            target,
            distribution,
            variant,
            hit_cache: Mutex::new(std::collections::HashMap::new()),
            bounds: Mutex::new(None),
        }
    }

    pub fn target(&self) -> &Target {
        self.target
    }

    pub fn variant(&self) -> GameVariant {
        self.variant
    }

    /// The target's bounding box, expanded 10% each side, computed once
    /// and cached.
    pub fn bounds(&self) -> Bounds {
        let mut bounds = self.bounds.lock().expect("bounds mutex poisoned");
        if let Some(b) = *bounds {
            return b;
        }
        let shapes: Vec<_> = self.target.beds().iter().map(|b| &b.shape).collect();
        let raw = Bounds::of_polygons(shapes.into_iter())
            .expect("target validated non-empty at construction");
        let expanded = raw.expanded(0.1);
        *bounds = Some(expanded);
        expanded
    }

    /// The probability distribution over typed hit outcomes for `aim`,
    /// cached on the exact `Vec2`.
    pub fn hit_distribution(&self, aim: Vec2) -> HitDistribution {
        if let Some(cached) = self.hit_cache.lock().expect("hit cache mutex poisoned").get(&aim) {
            return cached.clone();
        }

        let mut acc: BTreeMap<HitData, f64> = BTreeMap::new();
        let mut total = 0.0;
        for bed in self.target.beds() {
            let p = self.distribution.integrate_offset(&bed.shape, aim);
            total += p;
            *acc.entry(bed.hit).or_insert(0.0) += p;
        }
        let miss_mass = (1.0 - total).max(0.0);
        *acc.entry(HitData::miss()).or_insert(0.0) += miss_mass;

        let dist = HitDistribution::from_map(acc);
        self.hit_cache
            .lock()
            .expect("hit cache mutex poisoned")
            .insert(aim, dist.clone());
        dist
    }

    /// The successor-state distribution reachable from `state` by aiming
    /// at `aim`, under this game's variant.
    pub fn state_transitions(&self, state: State, aim: Vec2) -> StateDistribution {
        let hits = self.hit_distribution(aim);
        let mut acc: BTreeMap<State, f64> = BTreeMap::new();
        for (hit, p) in hits.entries() {
            let next = self.variant.transition(state, *hit);
            *acc.entry(next).or_insert(0.0) += p;
        }
        StateDistribution::from_map(acc)
    }

    /// Draw a single throw: sample the distribution, translate by `aim`,
    /// classify against the target, and apply the transition rule. Used
    /// only for simulation, never by the solver.
    pub fn throw(&self, state: State, aim: Vec2) -> State {
        let landing = self.distribution.sample() + aim;
        let hit = self.target.classify(landing);
        self.variant.transition(state, hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{BivariateNormal, IntegrationMode};

    #[test]
    fn checked_state_rejects_negative() {
        assert_eq!(checked_state(-1), Err(StateError::NegativeState { value: -1 }));
        assert_eq!(checked_state(20), Ok(20));
    }
    use crate::geometry::Polygon;
    use crate::target::{Bed, HitType};
    use nalgebra::Matrix2;

    fn single_bed_target(diff: i64, hit_type: HitType) -> Target {
        let shape = Polygon::new(vec![
            Vec2::new(-5.0, -5.0),
            Vec2::new(5.0, -5.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(-5.0, 5.0),
        ]);
        Target::new(vec![Bed::new(shape, HitData::new(hit_type, diff))]).unwrap()
    }

    fn unit_normal() -> BivariateNormal {
        BivariateNormal::with_mode(Vec2::ZERO, Matrix2::identity(), IntegrationMode::Quadrature)
            .unwrap()
            .with_seed(7)
    }
    #[test]
    fn transitions_sum_to_one() {
        let target = single_bed_target(-20, HitType::Normal);
        let dist = unit_normal();
        let game = Game::new(&target, &dist, GameVariant::FinishOnAny);
        let transitions = game.state_transitions(20, Vec2::ZERO);
        assert!((transitions.total() - 1.0).abs() < 1e-6);
    }
    #[test]
    fn hit_distribution_is_ordered_and_sums_to_one() {
        let target = single_bed_target(-20, HitType::Normal);
        let dist = unit_normal();
        let game = Game::new(&target, &dist, GameVariant::FinishOnAny);
        let hits = game.hit_distribution(Vec2::ZERO);
        assert!((hits.total() - 1.0).abs() < 1e-6);

        let keys: Vec<_> = hits.entries().iter().map(|(h, _)| *h).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
    #[test]
    fn hit_distribution_cache_is_consistent() {
        let target = single_bed_target(-20, HitType::Normal);
        let dist = unit_normal();
        let game = Game::new(&target, &dist, GameVariant::FinishOnAny);
        let a = game.hit_distribution(Vec2::new(1.0, 1.0));
        let b = game.hit_distribution(Vec2::new(1.0, 1.0));
        assert_eq!(a, b);
    }

    #[test]
    fn finish_on_any_busts_leave_state_unchanged() {
        let variant = GameVariant::FinishOnAny;
        let bust_hit = HitData::new(HitType::Normal, -30);
        assert_eq!(variant.transition(20, bust_hit), 20);
        let ok_hit = HitData::new(HitType::Normal, -20);
        assert_eq!(variant.transition(20, ok_hit), 0);
    }

    #[test]
    fn finish_on_double_requires_double_to_win() {
        let variant = GameVariant::FinishOnDouble;
        let exact_non_double = HitData::new(HitType::Normal, -20);
        assert_eq!(variant.transition(20, exact_non_double), 20);

        let exact_double = HitData::new(HitType::Double, -20);
        assert_eq!(variant.transition(20, exact_double), 0);

        let overshoot = HitData::new(HitType::Treble, -25);
        assert_eq!(variant.transition(20, overshoot), 20);

        let reduction = HitData::new(HitType::Normal, -5);
        assert_eq!(variant.transition(20, reduction), 15);
    }
    #[test]
    fn finish_on_double_bust_scenario() {
        let near_bed = Polygon::new(vec![
            Vec2::new(-2.0, -2.0),
            Vec2::new(2.0, -2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(-2.0, 2.0),
        ]);
        let far_bed = Polygon::new(vec![
            Vec2::new(5.0, 5.0),
            Vec2::new(7.0, 5.0),
            Vec2::new(7.0, 7.0),
            Vec2::new(5.0, 7.0),
        ]);
        let target = Target::new(vec![
            Bed::new(near_bed, HitData::new(HitType::Double, -20)),
            Bed::new(far_bed, HitData::new(HitType::Normal, -20)),
        ])
        .unwrap();

        let concentrated_at_origin =
            BivariateNormal::with_mode(Vec2::ZERO, Matrix2::new(0.01, 0.0, 0.0, 0.01), IntegrationMode::Quadrature)
                .unwrap();
        let game = Game::new(&target, &concentrated_at_origin, GameVariant::FinishOnDouble);
        let win_transitions = game.state_transitions(20, Vec2::ZERO);
        let win_entries = win_transitions.entries();
        let p_win = win_entries.iter().find(|(s, _)| *s == 0).map(|(_, p)| *p).unwrap_or(0.0);
        assert!(p_win > 0.9, "expected near-certain win, got {win_entries:?}");
        let p_stuck_at_twenty = win_entries.iter().find(|(s, _)| *s == 20).map(|(_, p)| *p).unwrap_or(0.0);
        assert!(p_stuck_at_twenty < 0.1);

        let concentrated_at_six =
            BivariateNormal::with_mode(Vec2::new(6.0, 6.0), Matrix2::new(0.01, 0.0, 0.0, 0.01), IntegrationMode::Quadrature)
                .unwrap();
        let game2 = Game::new(&target, &concentrated_at_six, GameVariant::FinishOnDouble);
        let bust_transitions = game2.state_transitions(20, Vec2::ZERO);
        let p_bust = bust_transitions
            .entries()
            .iter()
            .find(|(s, _)| *s == 20)
            .map(|(_, p)| *p)
            .unwrap_or(0.0);
        assert!(p_bust > 0.9, "expected near-certain bust, got {:?}", bust_transitions.entries());
    }

    #[test]
    fn bounds_are_expanded_and_cached() {
        let target = single_bed_target(-20, HitType::Normal);
        let dist = unit_normal();
        let game = Game::new(&target, &dist, GameVariant::FinishOnAny);
        let b1 = game.bounds();
        let b2 = game.bounds();
        assert_eq!(b1, b2);
        assert!(b1.min.x < -5.0 && b1.max.x > 5.0);
    }
}
