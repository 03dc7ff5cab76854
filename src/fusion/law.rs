use crate::error::{GeometryError, Result};
use crate::geometry::Discretization;
use crate::operations::boolean::DEFAULT_DEDUP_EPSILON;

/// Maps the fusion degree `d` to the area a bridge adds.
///
/// The fill laws give a fraction `f(d)` of the limit region with `f(0) = 0`,
/// `f(1) = 1`, non-decreasing. [`FusionLaw::AreaConserving`] instead puts back
/// the cladding area the pair lost to overlap, so the degree only decides
/// which pairs connect.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FusionLaw {
    /// `f(d) = d`
    #[default]
    Linear,
    /// `f(d) = d^exponent`, exponent > 0
    Power { exponent: f64 },
    /// `f(d) = 3d^2 - 2d^3`
    SmoothStep,
    /// Added area equals the overlap of the two claddings, capped at the
    /// limit region.
    AreaConserving,
}

impl FusionLaw {
    /// Fill fraction for a validated degree. `AreaConserving` reports the
    /// linear fraction; its target comes from [`FusionLaw::target_area`].
    #[must_use]
    pub fn fill(&self, degree: f64) -> f64 {
        let d = degree.clamp(0.0, 1.0);
        match *self {
            Self::Linear | Self::AreaConserving => d,
            Self::Power { exponent } => d.powf(exponent.max(f64::MIN_POSITIVE)),
            Self::SmoothStep => d * d * (3.0 - 2.0 * d),
        }
    }

    /// Fill fraction corrected for the number of fibers sharing the junction.
    ///
    /// `1 - (1 - f)^(1 + neighbors)`: an isolated pair uses `f` unchanged.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn effective_fill(&self, degree: f64, topology: Topology) -> f64 {
        let f = self.fill(degree);
        let power = (topology.neighbors as i32).saturating_add(1);
        1.0 - (1.0 - f).powi(power)
    }

    /// Bridge area to aim for, given the pair's limit region area and the
    /// area its claddings share.
    #[must_use]
    pub fn target_area(
        &self,
        degree: f64,
        topology: Topology,
        limit_area: f64,
        overlap_area: f64,
    ) -> f64 {
        match self {
            Self::AreaConserving if degree > 0.0 => overlap_area.max(0.0).min(limit_area),
            Self::AreaConserving => 0.0,
            _ => self.effective_fill(degree, topology) * limit_area,
        }
    }
}

/// How many other fibers are adjacent to both ends of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Topology {
    pub neighbors: usize,
}

impl Topology {
    /// A pair with no common neighbour.
    #[must_use]
    pub fn isolated() -> Self {
        Self::default()
    }

    /// A pair that shares `neighbors` adjacent fibers.
    #[must_use]
    pub fn junction(neighbors: usize) -> Self {
        Self { neighbors }
    }
}

/// Where the structure is placed after each fusion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CenteringPolicy {
    /// Fibers stay where they were placed.
    #[default]
    Keep,
    /// The outline centroid is moved to the origin.
    Origin,
}

/// Parameters of the fusion engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FusionConfig {
    pub law: FusionLaw,
    /// Influence radius factor: a pair connects when its gap is at most
    /// `reach * d * (r0 + r1) / 2`.
    pub reach: f64,
    /// Upper end of the virtual-radius search, in units of the pair extent.
    pub search_span: f64,
    /// Relative tolerance of the root finder.
    pub tolerance: f64,
    pub max_iterations: usize,
    pub discretization: Discretization,
    /// Vertex merge distance for boolean cleanup, relative to the operand
    /// extent.
    pub dedup_epsilon: f64,
    pub centering: CenteringPolicy,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            law: FusionLaw::default(),
            reach: 2.0,
            search_span: 1e6,
            tolerance: 1e-8,
            max_iterations: 200,
            discretization: Discretization::default(),
            dedup_epsilon: DEFAULT_DEDUP_EPSILON,
            centering: CenteringPolicy::default(),
        }
    }
}

impl FusionConfig {
    #[must_use]
    pub fn with_law(mut self, law: FusionLaw) -> Self {
        self.law = law;
        self
    }

    #[must_use]
    pub fn with_reach(mut self, reach: f64) -> Self {
        self.reach = reach;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_discretization(mut self, discretization: Discretization) -> Self {
        self.discretization = discretization;
        self
    }

    #[must_use]
    pub fn with_centering(mut self, centering: CenteringPolicy) -> Self {
        self.centering = centering;
        self
    }

    /// Largest clad gap a pair may have and still connect at `degree`.
    #[must_use]
    pub fn influence_gap(&self, degree: f64, r0: f64, r1: f64) -> f64 {
        self.reach * degree * 0.5 * (r0 + r1)
    }
}

/// Checks that a fusion degree lies in `[0, 1]`.
///
/// # Errors
///
/// Returns `GeometryError::ParameterOutOfRange` otherwise.
pub fn validate_degree(degree: f64) -> Result<f64> {
    if degree.is_finite() && (0.0..=1.0).contains(&degree) {
        Ok(degree)
    } else {
        Err(GeometryError::ParameterOutOfRange {
            parameter: "fusion_degree",
            value: degree,
            min: 0.0,
            max: 1.0,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn laws_hit_end_points() {
        for law in [
            FusionLaw::Linear,
            FusionLaw::Power { exponent: 0.5 },
            FusionLaw::Power { exponent: 3.0 },
            FusionLaw::SmoothStep,
            FusionLaw::AreaConserving,
        ] {
            assert_relative_eq!(law.fill(0.0), 0.0);
            assert_relative_eq!(law.fill(1.0), 1.0);
        }
    }

    #[test]
    fn laws_are_non_decreasing() {
        for law in [FusionLaw::Linear, FusionLaw::Power { exponent: 2.0 }, FusionLaw::SmoothStep] {
            let mut prev = 0.0;
            for i in 0..=100 {
                let f = law.fill(f64::from(i) / 100.0);
                assert!(f >= prev);
                prev = f;
            }
        }
    }

    #[test]
    fn junction_fills_faster() {
        let law = FusionLaw::Linear;
        assert_relative_eq!(law.effective_fill(0.5, Topology::isolated()), 0.5);
        assert_relative_eq!(law.effective_fill(0.5, Topology::junction(1)), 0.75);
        assert_relative_eq!(law.effective_fill(1.0, Topology::junction(4)), 1.0);
    }

    #[test]
    fn area_conserving_target_follows_overlap() {
        let law = FusionLaw::AreaConserving;
        let t = Topology::junction(2);
        assert_relative_eq!(law.target_area(0.0, t, 1.0, 0.3), 0.0);
        assert_relative_eq!(law.target_area(0.2, t, 1.0, 0.3), 0.3);
        assert_relative_eq!(law.target_area(0.9, t, 1.0, 0.3), 0.3);
        assert_relative_eq!(law.target_area(0.5, t, 0.1, 0.3), 0.1);
        assert_relative_eq!(
            FusionLaw::Linear.target_area(0.5, Topology::isolated(), 2.0, 0.3),
            1.0
        );
    }

    #[test]
    fn degree_validation() {
        assert!(validate_degree(0.0).is_ok());
        assert!(validate_degree(1.0).is_ok());
        assert!(validate_degree(-0.1).is_err());
        assert!(validate_degree(1.5).is_err());
        assert!(validate_degree(f64::NAN).is_err());
    }

    #[test]
    fn influence_gap_scales_with_degree() {
        let cfg = FusionConfig::default();
        assert_relative_eq!(cfg.influence_gap(0.5, 1.0, 1.0), 1.0);
        assert_relative_eq!(cfg.influence_gap(0.0, 1.0, 1.0), 0.0);
    }
}
