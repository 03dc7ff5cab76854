use super::{left_normal, Point2, TOLERANCE};

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
/// Parallel (including collinear) segments report no intersection.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;

    let cross = da.x * db.y - da.y * db.x;
    if cross.abs() < TOLERANCE {
        return None;
    }

    let dx = b0.x - a0.x;
    let dy = b0.y - a0.y;
    let t = (dx * db.y - dy * db.x) / cross;
    let u = (dx * da.y - dy * da.x) / cross;

    // Use a small epsilon to include endpoints.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t_clamped = t.clamp(0.0, 1.0);
        Some((a0 + da * t_clamped, t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Intersection of two full circles.
///
/// Returns `(left, right)` where `left` lies on the left of the directed line
/// `c0 -> c1`. Tangent circles return the same point twice. `None` when the
/// circles are disjoint, nested, or concentric.
#[must_use]
pub fn circle_circle_intersect_2d(
    c0: &Point2,
    r0: f64,
    c1: &Point2,
    r1: f64,
) -> Option<(Point2, Point2)> {
    let delta = c1 - c0;
    let d = delta.norm();
    if d < TOLERANCE {
        return None;
    }
    if d > r0 + r1 + TOLERANCE * d || d < (r0 - r1).abs() - TOLERANCE * d {
        return None;
    }

    // Distance from c0 to the radical line, then half-chord length.
    let a = (d * d + r0 * r0 - r1 * r1) / (2.0 * d);
    let h = (r0 * r0 - a * a).max(0.0).sqrt();

    let u = delta / d;
    let n = left_normal(&u);
    let foot = c0 + u * a;
    Some((foot + n * h, foot - n * h))
}
