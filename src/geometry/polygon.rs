use super::Vec2;
use serde::{Deserialize, Serialize};

/// A simple planar polygon given as an ordered sequence of vertices.
///
/// May be non-convex for containment purposes; quadrature integration
/// (see `crate::quadrature`) requires convexity and does not itself check
/// for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Vec2>,
}

impl Polygon {
    pub fn new(vertices: Vec<Vec2>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Even-odd ray-casting containment test with a half-open edge
    /// convention: a point exactly on a horizontal edge is
    /// excluded, a point exactly on the lower endpoint of a non-horizontal
    /// edge is included. Deterministic on non-convex polygons.
    pub fn contains(&self, p: Vec2) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        for i in 0..n {
            let mut a = self.vertices[i];
            let mut b = self.vertices[(i + 1) % n];
            if a.y > b.y {
                std::mem::swap(&mut a, &mut b);
            }

            if a.y <= p.y && p.y < b.y {
                let t = (p.y - a.y) / (b.y - a.y);
                let x_at = a.x + t * (b.x - a.x);
                if x_at >= p.x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Whether the polygon is convex (all cross products of consecutive
    /// edges share a sign). Used to warn callers who request quadrature
    /// over an unverified-convex region (Design Notes).
    pub fn is_convex(&self) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut sign = 0i32;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let c = self.vertices[(i + 2) % n];
            let cross = (b - a).x * (c - b).y - (b - a).y * (c - b).x;
            if cross.abs() > 1e-12 {
                let s = if cross > 0.0 { 1 } else { -1 };
                if sign == 0 {
                    sign = s;
                } else if sign != s {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> Polygon {
        Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(0.0, 2.0),
        ])
    }

    // Scenario F
    #[test]
    fn l_shape_containment() {
        let l = l_shape();
        assert!(l.contains(Vec2::new(0.5, 0.5)));
        assert!(l.contains(Vec2::new(0.5, 1.5)));
        assert!(l.contains(Vec2::new(1.5, 0.5)));
        assert!(!l.contains(Vec2::new(1.5, 1.5)));
    }
    #[test]
    fn containment_stable_under_cyclic_rotation() {
        let l = l_shape();
        let verts = l.vertices().to_vec();
        let probes = [
            Vec2::new(0.5, 0.5),
            Vec2::new(0.5, 1.5),
            Vec2::new(1.5, 0.5),
            Vec2::new(1.5, 1.5),
        ];
        let base: Vec<bool> = probes.iter().map(|&p| l.contains(p)).collect();

        for offset in 1..verts.len() {
            let mut rotated = verts[offset..].to_vec();
            rotated.extend_from_slice(&verts[..offset]);
            let rotated_poly = Polygon::new(rotated);
            let answers: Vec<bool> = probes.iter().map(|&p| rotated_poly.contains(p)).collect();
            assert_eq!(base, answers, "mismatch at rotation offset {offset}");
        }
    }
    #[test]
    fn outside_hull_is_never_contained() {
        let square = Polygon::new(vec![
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ]);
        for &p in &[
            Vec2::new(5.0, 5.0),
            Vec2::new(-5.0, 0.0),
            Vec2::new(0.0, 5.0),
            Vec2::new(2.0, 2.0),
        ] {
            assert!(!square.contains(p));
        }
    }

    #[test]
    fn horizontal_edge_excluded() {
        // point sits exactly on the lower horizontal edge of a unit square
        let square = Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]);
        assert!(!square.contains(Vec2::new(0.5, 0.0)));
    }

    #[test]
    fn convexity_detection() {
        let square = Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]);
        assert!(square.is_convex());
        assert!(!l_shape().is_convex());
    }
}
