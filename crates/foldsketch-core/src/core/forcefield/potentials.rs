use nalgebra::{Point2, Vector2};

const MIN_DISTANCE: f64 = 1e-9;

/// Harmonic distance well `k (d - d0)^2`.
///
/// Returns the energy and the gradient with respect to `p`; the gradient with respect to `q`
/// is its negation.
#[inline]
pub fn harmonic_distance(
    p: &Point2<f64>,
    q: &Point2<f64>,
    d0: f64,
    k: f64,
) -> (f64, Vector2<f64>) {
    let delta = p - q;
    let dist = delta.norm();
    let stretch = dist - d0;
    let energy = k * stretch * stretch;
    if dist < MIN_DISTANCE {
        return (energy, Vector2::zeros());
    }
    (energy, delta * (2.0 * k * stretch / dist))
}

/// One-sided repulsion `k (cutoff - d)^2` for `d < cutoff`, zero beyond.
#[inline]
pub fn soft_repulsion(
    p: &Point2<f64>,
    q: &Point2<f64>,
    cutoff: f64,
    k: f64,
) -> (f64, Vector2<f64>) {
    let delta = p - q;
    let dist = delta.norm();
    if dist >= cutoff {
        return (0.0, Vector2::zeros());
    }
    let overlap = cutoff - dist;
    let energy = k * overlap * overlap;
    if dist < MIN_DISTANCE {
        return (energy, Vector2::zeros());
    }
    (energy, delta * (-2.0 * k * overlap / dist))
}

/// Angle restraint `k (cos θ - cos θ0)^2` with the vertex at `b`.
///
/// Returns the energy and the gradients with respect to `a`, `b` and `c`.
#[inline]
pub fn cosine_angle(
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    cos0: f64,
    k: f64,
) -> (f64, [Vector2<f64>; 3]) {
    let v1 = a - b;
    let v2 = c - b;
    let n1 = v1.norm();
    let n2 = v2.norm();
    if n1 < MIN_DISTANCE || n2 < MIN_DISTANCE {
        return (0.0, [Vector2::zeros(); 3]);
    }

    let cos = v1.dot(&v2) / (n1 * n2);
    let diff = cos - cos0;
    let energy = k * diff * diff;

    let prefactor = 2.0 * k * diff;
    let grad_a = (v2 / (n1 * n2) - v1 * (cos / (n1 * n1))) * prefactor;
    let grad_c = (v1 / (n1 * n2) - v2 * (cos / (n2 * n2))) * prefactor;
    (energy, [grad_a, -(grad_a + grad_c), grad_c])
}
