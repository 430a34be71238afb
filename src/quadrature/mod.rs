//! Fixed 7-point, degree-5 Dunavant quadrature on the reference triangle,
//! applied to convex polygons via fan triangulation.

use crate::geometry::{triangle_area, Polygon, Vec2};

/// One quadrature node: barycentric coordinates `(l0, l1, l2)` and weight.
struct Node {
    l0: f64,
    l1: f64,
    l2: f64,
    w: f64,
}

// Standard Dunavant 7-point degree-5 rule. Weights sum to 1.
const NODES: [Node; 7] = [
    Node { l0: 1.0 / 3.0, l1: 1.0 / 3.0, l2: 1.0 / 3.0, w: 0.225 },
    Node { l0: 0.0597158717, l1: 0.4701420641, l2: 0.4701420641, w: 0.1323941527 },
    Node { l0: 0.4701420641, l1: 0.0597158717, l2: 0.4701420641, w: 0.1323941527 },
    Node { l0: 0.4701420641, l1: 0.4701420641, l2: 0.0597158717, w: 0.1323941527 },
    Node { l0: 0.7974269853, l1: 0.1012865073, l2: 0.1012865073, w: 0.1259391805 },
    Node { l0: 0.1012865073, l1: 0.7974269853, l2: 0.1012865073, w: 0.1259391805 },
    Node { l0: 0.1012865073, l1: 0.1012865073, l2: 0.7974269853, w: 0.1259391805 },
];

/// Integrate `f` over the triangle `(v0, v1, v2)` using the fixed 7-point
/// rule. Exact for polynomials of degree <= 5.
pub fn integrate_triangle<F: Fn(Vec2) -> f64>(v0: Vec2, v1: Vec2, v2: Vec2, f: F) -> f64 {
    let area = triangle_area(v0, v1, v2);
    let mut sum = 0.0;
    for node in &NODES {
        let p = Vec2::new(
            node.l0 * v0.x + node.l1 * v1.x + node.l2 * v2.x,
            node.l0 * v0.y + node.l1 * v1.y + node.l2 * v2.y,
        );
        sum += node.w * f(p);
    }
    area * sum
}

/// Integrate `f` over a convex `polygon` by fan-triangulating from vertex 0
/// and summing the per-triangle quadrature. Callers must ensure `polygon`
/// is convex; a non-convex polygon may produce inverted triangles that
/// corrupt the result — use `Polygon::is_convex` to check, or
/// integrate with a Monte-Carlo distribution variant instead.
pub fn integrate_polygon<F: Fn(Vec2) -> f64>(polygon: &Polygon, f: F) -> f64 {
    let verts = polygon.vertices();
    if verts.len() < 3 {
        return 0.0;
    }
    if !polygon.is_convex() {
        log::warn!(
            "quadrature requested over a polygon that is not verified convex \
             ({} vertices); result may be wrong",
            verts.len()
        );
    }
    let v0 = verts[0];
    let mut total = 0.0;
    for i in 1..verts.len() - 1 {
        total += integrate_triangle(v0, verts[i], verts[i + 1], &f);
    }
    total
}
