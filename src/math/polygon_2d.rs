use super::{Point2, TOLERANCE};

/// Computes the signed area of a closed ring (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise. The ring may or may
/// not repeat its first point at the end.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Rotates a closed ring so it starts at the leftmost vertex (smallest x),
/// breaking ties by smallest y. Ensures deterministic output for tests.
#[must_use]
pub fn rotate_to_canonical_start(points: &[Point2]) -> Vec<Point2> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let mut best = 0;
    for (i, pt) in points.iter().enumerate().skip(1) {
        let b = &points[best];
        if pt.x < b.x - TOLERANCE || (pt.x - b.x).abs() < TOLERANCE && pt.y < b.y {
            best = i;
        }
    }
    if best == 0 {
        return points.to_vec();
    }
    let mut rotated = Vec::with_capacity(points.len());
    rotated.extend_from_slice(&points[best..]);
    rotated.extend_from_slice(&points[..best]);
    rotated
}

/// Removes consecutive vertices closer than `epsilon`, including the implicit
/// closing edge, and drops a repeated closing point.
///
/// Returns an open ring (first point not repeated). Fewer than three points
/// means the ring collapsed.
#[must_use]
pub fn dedup_ring(points: &[Point2], epsilon: f64) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_none_or(|last| (p - last).norm() > epsilon) {
            out.push(*p);
        }
    }
    while out.len() > 1 {
        let (first, last) = (out[0], out[out.len() - 1]);
        if (first - last).norm() > epsilon {
            break;
        }
        out.pop();
    }
    out
}

/// Returns the ring oriented counter-clockwise (`ccw = true`) or clockwise.
#[must_use]
pub fn oriented(points: Vec<Point2>, ccw: bool) -> Vec<Point2> {
    let is_ccw = signed_area_2d(&points) > 0.0;
    if is_ccw == ccw {
        points
    } else {
        let mut points = points;
        points.reverse();
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square_ccw() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        assert!((signed_area_2d(&unit_square_ccw()) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut pts = unit_square_ccw();
        pts.reverse();
        assert!((signed_area_2d(&pts) + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!((signed_area_2d(&[Point2::new(0.0, 0.0)])).abs() < TOLERANCE);
        assert!((signed_area_2d(&[])).abs() < TOLERANCE);
    }

    #[test]
    fn canonical_start_rotation() {
        let pts = vec![
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
            Point2::new(0.0, 0.0),
        ];
        let rotated = rotate_to_canonical_start(&pts);
        assert!((rotated[0].x).abs() < TOLERANCE);
        assert!((rotated[0].y).abs() < TOLERANCE);
    }

    #[test]
    fn dedup_merges_near_duplicates_and_closing_point() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0 + 1e-13, 1e-13),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1e-14),
        ];
        let cleaned = dedup_ring(&pts, 1e-9);
        assert_eq!(cleaned.len(), 3);
    }

    #[test]
    fn dedup_collapses_point_cloud() {
        let pts = vec![Point2::new(2.0, 2.0); 5];
        assert_eq!(dedup_ring(&pts, 1e-9).len(), 1);
    }

    #[test]
    fn oriented_flips_clockwise() {
        let mut pts = unit_square_ccw();
        pts.reverse();
        let ccw = oriented(pts, true);
        assert!(signed_area_2d(&ccw) > 0.0);
    }
}
