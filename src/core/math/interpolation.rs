use nalgebra::{Point2, Vector3};

const EPSILON: f32 = 1e-5;

/// Barycentric weights (alpha, beta, gamma) of `p` with respect to triangle `(v1, v2, v3)`.
///
/// Returns `None` for degenerate triangles.
pub fn barycentric_coordinates(
    p: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
    v3: Point2<f32>,
) -> Option<Vector3<f32>> {
    let e1 = v2 - v1;
    let e2 = v3 - v1;
    let p_v1 = p - v1;

    // Twice the signed area
    let area_x2 = e1.x * e2.y - e1.y * e2.x;
    if area_x2.abs() < EPSILON {
        return None;
    }
    let inv_area_x2 = 1.0 / area_x2;

    let beta = (p_v1.x * e2.y - p_v1.y * e2.x) * inv_area_x2;
    let gamma = (e1.x * p_v1.y - e1.y * p_v1.x) * inv_area_x2;

    Some(Vector3::new(1.0 - beta - gamma, beta, gamma))
}

#[inline(always)]
pub fn is_inside_triangle(bary: Vector3<f32>) -> bool {
    bary.x >= -EPSILON && bary.y >= -EPSILON && bary.z >= -EPSILON
}

/// Converts screen-space barycentrics into perspective-correct weights given
/// each vertex's clip-space `w`.
pub fn perspective_correct_barycentric(
    bary: Vector3<f32>,
    w1: f32,
    w2: f32,
    w3: f32,
) -> Option<Vector3<f32>> {
    let inv = |w: f32| if w.abs() > EPSILON { 1.0 / w } else { 1.0 };

    let weighted = Vector3::new(bary.x * inv(w1), bary.y * inv(w2), bary.z * inv(w3));
    let sum = weighted.x + weighted.y + weighted.z;
    if sum.abs() < EPSILON {
        return None;
    }
    Some(weighted / sum)
}
