use super::intersect_2d::segment_segment_intersect_2d;
use super::Point2;

/// Returns the minimum distance from point `p` to the line segment `a`-`b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return (p - a).norm();
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (p - (a + d * t)).norm()
}

/// Returns the minimum distance between segments `a0`-`a1` and `b0`-`b1`.
///
/// Zero when the segments cross or touch.
#[must_use]
pub fn segment_to_segment_dist(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> f64 {
    if segment_segment_intersect_2d(a0, a1, b0, b1).is_some() {
        return 0.0;
    }
    point_to_segment_dist(a0, b0, b1)
        .min(point_to_segment_dist(a1, b0, b1))
        .min(point_to_segment_dist(b0, a0, a1))
        .min(point_to_segment_dist(b1, a0, a1))
}

/// Minimum distance between two polylines given as consecutive point pairs.
///
/// Brute force over all segment pairs; both inputs are expected to be a few
/// hundred points at most. Returns `f64::INFINITY` if either side has no segment.
#[must_use]
pub fn polyline_to_polyline_dist(a: &[Point2], b: &[Point2]) -> f64 {
    let mut best = f64::INFINITY;
    for sa in a.windows(2) {
        for sb in b.windows(2) {
            best = best.min(segment_to_segment_dist(&sa[0], &sa[1], &sb[0], &sb[1]));
            if best == 0.0 {
                return best;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn point_to_segment_perpendicular() {
        let d = point_to_segment_dist(&p(5.0, 3.0), &p(0.0, 0.0), &p(10.0, 0.0));
        assert!((d - 3.0).abs() < EPS);
    }

    #[test]
    fn point_to_segment_beyond_end() {
        let d = point_to_segment_dist(&p(13.0, 4.0), &p(0.0, 0.0), &p(10.0, 0.0));
        assert!((d - 5.0).abs() < EPS);
    }

    #[test]
    fn point_to_degenerate_segment() {
        let d = point_to_segment_dist(&p(3.0, 4.0), &p(0.0, 0.0), &p(0.0, 0.0));
        assert!((d - 5.0).abs() < EPS);
    }

    #[test]
    fn crossing_segments_are_at_zero_distance() {
        let d = segment_to_segment_dist(&p(0.0, 0.0), &p(2.0, 2.0), &p(0.0, 2.0), &p(2.0, 0.0));
        assert!(d.abs() < EPS);
    }

    #[test]
    fn parallel_segments_distance() {
        let d = segment_to_segment_dist(&p(0.0, 0.0), &p(4.0, 0.0), &p(1.0, 2.0), &p(3.0, 2.0));
        assert!((d - 2.0).abs() < EPS);
    }

    #[test]
    fn polyline_distance_takes_minimum() {
        let a = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)];
        let b = [p(3.0, 0.5), p(3.0, 5.0)];
        assert!((polyline_to_polyline_dist(&a, &b) - 2.0).abs() < EPS);
        assert!(polyline_to_polyline_dist(&a, &[p(0.0, 0.0)]).is_infinite());
    }
}
