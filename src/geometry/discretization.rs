use std::f64::consts::TAU;

/// Parameters controlling how analytic curves are turned into polylines.
///
/// The deviation is relative to the radius of the curve so that fibers
/// expressed in meters and in micrometers are sampled alike.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Discretization {
    /// Maximum chord-to-arc distance as a fraction of the radius.
    pub max_deviation: f64,
    /// Minimum number of segments for a full circle.
    pub min_segments: usize,
    /// Maximum number of segments for a full circle.
    pub max_segments: usize,
}

impl Default for Discretization {
    fn default() -> Self {
        Self {
            max_deviation: 1e-4,
            min_segments: 16,
            max_segments: 512,
        }
    }
}

impl Discretization {
    /// Number of segments for an arc of the given sweep (radians).
    ///
    /// Partial arcs get a proportional share of the full-circle budget, with
    /// at least two segments.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn segments_for_sweep(&self, sweep: f64) -> usize {
        let sweep = sweep.abs().min(TAU);
        let full = self.full_circle_segments();
        let share = (full as f64 * sweep / TAU).ceil() as usize;
        share.max(2)
    }

    /// Number of segments for a full circle.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn full_circle_segments(&self) -> usize {
        if self.max_deviation > 0.0 && self.max_deviation < 1.0 {
            // Sagitta: deviation = r * (1 - cos(theta / 2)).
            let half_angle = (1.0 - self.max_deviation).acos();
            let computed = (TAU / (2.0 * half_angle)).ceil() as usize;
            computed.clamp(self.min_segments, self.max_segments)
        } else {
            self.min_segments
        }
    }
}
