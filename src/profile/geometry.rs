use tracing::{debug, warn};

use crate::error::Result;
use crate::grid::{geometry_bounds, BoundsPolicy, CoordinateSystem, Resolution};

use super::{IndexMap, Profile};

/// Builds the rasterized index map of a profile.
///
/// # Example
///
/// ```
/// use fiberfuse::geometry::{Circle, Shape};
/// use fiberfuse::grid::{BoundsPolicy, Resolution};
/// use fiberfuse::math::Point2;
/// use fiberfuse::profile::{Geometry, Layer, Profile};
///
/// let mut profile = Profile::new(1.0);
/// let disc = Shape::Circle(Circle::new(Point2::origin(), 1.0).unwrap());
/// profile.add_layer(Layer::new("clad", disc, 1.444));
/// let map = Geometry::new(&profile, BoundsPolicy::default(), Resolution::square(64))
///     .build()
///     .unwrap();
/// assert_eq!(map.index_range(), (1.0, 1.444));
/// ```
pub struct Geometry<'a> {
    profile: &'a Profile,
    policy: BoundsPolicy,
    resolution: Resolution,
    scrambling: Option<(f64, u64)>,
}

impl<'a> Geometry<'a> {
    #[must_use]
    pub fn new(profile: &'a Profile, policy: BoundsPolicy, resolution: Resolution) -> Self {
        Self {
            profile,
            policy,
            resolution,
            scrambling: None,
        }
    }

    /// Perturbs every layer index by a relative amount in `[0, factor)`
    /// before rasterizing, to lift mode degeneracies.
    #[must_use]
    pub fn with_index_scrambling(mut self, factor: f64, seed: u64) -> Self {
        self.scrambling = Some((factor, seed));
        self
    }

    /// Builds the grid and paints the layers.
    ///
    /// # Errors
    ///
    /// - `GridError` variants for an invalid resolution or extent
    /// - `GeometryError::Degenerate` if a geometry-driven bounds policy has
    ///   nothing to measure
    /// - `ProfileError::LayerOverlapAmbiguity` if the layer order is undecided
    pub fn build(&self) -> Result<IndexMap> {
        let shapes = self.profile.shapes();
        let coordinates = CoordinateSystem::build(&self.policy, self.resolution, &shapes)?;

        if let Ok(extent) = geometry_bounds(&shapes) {
            if !coordinates.encloses(&extent) {
                warn!(
                    grid = ?coordinates.bounds(),
                    geometry = ?extent,
                    "grid does not enclose the geometry; it will be clipped"
                );
            }
        }

        let scrambled;
        let profile = match self.scrambling {
            Some((factor, seed)) => {
                scrambled = self.profile.with_index_scrambling(factor, seed);
                &scrambled
            }
            None => self.profile,
        };
        let values = coordinates.rasterize_layers(profile)?;
        debug!(
            nx = coordinates.nx(),
            ny = coordinates.ny(),
            layers = profile.layers().len(),
            "index map rasterized"
        );
        Ok(IndexMap::new(coordinates, values))
    }
}
