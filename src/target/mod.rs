//! The dartboard itself: an ordered collection of scoring beds, each a
//! polygon tagged with a typed score delta. Classification walks the
//! beds in order and returns the first one containing the probe point.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::{Polygon, Vec2};

/// The three hit types a bed can carry, totally ordered
/// `Normal < Double < Treble`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HitType {
    Normal,
    Double,
    Treble,
}

/// A typed score delta: the hit type plus the signed change to the
/// countdown state. `diff <= 0` for in-target beds (points are
/// deducted); a miss is `(Normal, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HitData {
    pub hit_type: HitType,
    pub diff: i64,
}

impl HitData {
    pub fn new(hit_type: HitType, diff: i64) -> Self {
        Self { hit_type, diff }
    }

    /// The canonical miss outcome.
    pub fn miss() -> Self {
        Self { hit_type: HitType::Normal, diff: 0 }
    }
}

/// A scoring region: a polygon plus the typed hit it produces when
/// struck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bed {
    pub shape: Polygon,
    pub hit: HitData,
}

impl Bed {
    pub fn new(shape: Polygon, hit: HitData) -> Self {
        Self { shape, hit }
    }
}

/// An ordered collection of beds. Beds are classified by iteration
/// order: `classify` returns the first bed containing the probed point,
/// so overlapping beds resolve to whichever was inserted earlier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    beds: Vec<Bed>,
}

impl Target {
    /// Construct a target, validating every bed has a non-empty (>= 3
    /// vertex) shape. Errors if `beds` is empty.
    pub fn new(beds: Vec<Bed>) -> Result<Self, ConfigError> {
        if beds.is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        for (index, bed) in beds.iter().enumerate() {
            if bed.shape.len() < 3 {
                return Err(ConfigError::DegenerateBed { index });
            }
        }
        Ok(Self { beds })
    }

    pub fn beds(&self) -> &[Bed] {
        &self.beds
    }

    /// Classify `p` against the target: the hit of the first bed whose
    /// polygon contains `p`, or the miss outcome if none does.
    pub fn classify(&self, p: Vec2) -> HitData {
        self.beds
            .iter()
            .find(|bed| bed.shape.contains(p))
            .map(|bed| bed.hit)
            .unwrap_or_else(HitData::miss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(cx: f64, cy: f64, half: f64) -> Polygon {
        Polygon::new(vec![
            Vec2::new(cx - half, cy - half),
            Vec2::new(cx + half, cy - half),
            Vec2::new(cx + half, cy + half),
            Vec2::new(cx - half, cy + half),
        ])
    }

    #[test]
    fn rejects_empty_target() {
        assert_eq!(Target::new(vec![]), Err(ConfigError::EmptyTarget));
    }

    #[test]
    fn rejects_degenerate_bed() {
        let degenerate = Polygon::new(vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)]);
        let result = Target::new(vec![Bed::new(degenerate, HitData::new(HitType::Normal, -5))]);
        assert_eq!(result, Err(ConfigError::DegenerateBed { index: 0 }));
    }

    #[test]
    fn classify_returns_first_containing_bed() {
        let overlapping_a = square(0.0, 0.0, 5.0);
        let overlapping_b = square(0.0, 0.0, 2.0);
        let target = Target::new(vec![
            Bed::new(overlapping_a, HitData::new(HitType::Normal, -1)),
            Bed::new(overlapping_b, HitData::new(HitType::Treble, -3)),
        ])
        .unwrap();
        // both beds contain the origin; the first-inserted bed wins
        assert_eq!(target.classify(Vec2::ZERO).hit_type, HitType::Normal);
    }

    #[test]
    fn classify_outside_every_bed_is_a_miss() {
        let target = Target::new(vec![Bed::new(
            square(0.0, 0.0, 1.0),
            HitData::new(HitType::Double, -2),
        )])
        .unwrap();
        assert_eq!(target.classify(Vec2::new(50.0, 50.0)), HitData::miss());
    }

    #[test]
    fn hit_type_ordering() {
        assert!(HitType::Normal < HitType::Double);
        assert!(HitType::Double < HitType::Treble);
    }
}
