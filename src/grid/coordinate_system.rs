use crate::error::{GeometryError, GridError, Result};
use crate::geometry::Shape;
use crate::math::{Bounds, Point2};
use crate::operations::boolean::{union_all, DEFAULT_DEDUP_EPSILON};

/// Number of samples along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    pub nx: usize,
    pub ny: usize,
}

impl Resolution {
    #[must_use]
    pub fn new(nx: usize, ny: usize) -> Self {
        Self { nx, ny }
    }

    #[must_use]
    pub fn square(n: usize) -> Self {
        Self { nx: n, ny: n }
    }

    /// Rounds both axes up to the next odd count.
    #[must_use]
    pub fn to_odd(self) -> Self {
        Self {
            nx: self.nx / 2 * 2 + 1,
            ny: self.ny / 2 * 2 + 1,
        }
    }
}

/// How the extent of a grid is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundsPolicy {
    /// Use the given bounds as they are.
    Explicit(Bounds),
    /// Square bounds centred on the geometry centroid, reaching the farthest
    /// bounding-box edge times `padding`. With `include_center` the resolution
    /// is made odd so one sample lies on the centroid.
    Centering { padding: f64, include_center: bool },
    /// Tight bounding box of the geometry.
    Full,
}

impl Default for BoundsPolicy {
    fn default() -> Self {
        Self::Centering {
            padding: 1.2,
            include_center: true,
        }
    }
}

/// Half of a grid kept when the field is mirror-symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridHalf {
    Left,
    Right,
    Bottom,
    Top,
}

/// An immutable regular sampling grid.
///
/// Samples sit at cell centres: column `i` is at
/// `x_min + (i + 0.5) * dx`, row `j` at `y_min + (j + 0.5) * dy`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordinateSystem {
    bounds: Bounds,
    nx: usize,
    ny: usize,
}

impl CoordinateSystem {
    /// Creates a grid over explicit bounds.
    ///
    /// # Errors
    ///
    /// - `GridError::InvalidResolution` if either axis has fewer than 2 samples
    /// - `GridError::InvalidBounds` if a span is not finite and positive
    pub fn new(bounds: Bounds, resolution: Resolution) -> Result<Self> {
        if resolution.nx < 2 || resolution.ny < 2 {
            return Err(GridError::InvalidResolution {
                nx: resolution.nx,
                ny: resolution.ny,
            }
            .into());
        }
        for (axis, min, max) in [
            ("x", bounds.x_min, bounds.x_max),
            ("y", bounds.y_min, bounds.y_max),
        ] {
            if !min.is_finite() || !max.is_finite() || max <= min {
                return Err(GridError::InvalidBounds { axis, min, max }.into());
            }
        }
        Ok(Self {
            bounds,
            nx: resolution.nx,
            ny: resolution.ny,
        })
    }

    /// Creates a grid whose extent follows `policy` for the given shapes.
    ///
    /// # Errors
    ///
    /// - the errors of [`CoordinateSystem::new`]
    /// - `GeometryError::Degenerate` if a geometry-driven policy is given no
    ///   geometry with an extent
    pub fn build(policy: &BoundsPolicy, resolution: Resolution, shapes: &[&Shape]) -> Result<Self> {
        match *policy {
            BoundsPolicy::Explicit(bounds) => Self::new(bounds, resolution),
            BoundsPolicy::Full => Self::new(geometry_bounds(shapes)?, resolution),
            BoundsPolicy::Centering {
                padding,
                include_center,
            } => {
                let bbox = geometry_bounds(shapes)?;
                let owned: Vec<Shape> = shapes.iter().map(|s| (*s).clone()).collect();
                let center = union_all(&owned, DEFAULT_DEDUP_EPSILON)
                    .centroid()
                    .unwrap_or_else(|| bbox.center());
                let reach = [
                    center.x - bbox.x_min,
                    bbox.x_max - center.x,
                    center.y - bbox.y_min,
                    bbox.y_max - center.y,
                ]
                .into_iter()
                .fold(0.0, f64::max);
                let half = reach * padding;
                let bounds = Bounds::new(
                    center.x - half,
                    center.x + half,
                    center.y - half,
                    center.y + half,
                );
                let resolution = if include_center {
                    resolution.to_odd()
                } else {
                    resolution
                };
                Self::new(bounds, resolution)
            }
        }
    }

    /// Same resolution with both spans scaled by `factor` about the centre.
    ///
    /// # Errors
    ///
    /// Returns `GridError::InvalidBounds` if the scaled spans are not
    /// positive.
    pub fn with_padding(&self, factor: f64) -> Result<Self> {
        Self::new(self.bounds.scaled(factor), self.resolution())
    }

    /// The half of the grid on one side of its centre line, with the same
    /// spacing. Its samples are the matching samples of `self`; with an odd
    /// count the centre column (or row) is kept.
    ///
    /// # Errors
    ///
    /// Returns `GridError::InvalidResolution` if the half has fewer than 2
    /// samples across.
    #[allow(clippy::cast_precision_loss)]
    pub fn half(&self, side: GridHalf) -> Result<Self> {
        let b = self.bounds;
        let (nx, ny) = match side {
            GridHalf::Left | GridHalf::Right => (self.nx.div_ceil(2), self.ny),
            GridHalf::Bottom | GridHalf::Top => (self.nx, self.ny.div_ceil(2)),
        };
        let (width, height) = (nx as f64 * self.dx(), ny as f64 * self.dy());
        let bounds = match side {
            GridHalf::Left => Bounds::new(b.x_min, b.x_min + width, b.y_min, b.y_max),
            GridHalf::Right => Bounds::new(b.x_max - width, b.x_max, b.y_min, b.y_max),
            GridHalf::Bottom => Bounds::new(b.x_min, b.x_max, b.y_min, b.y_min + height),
            GridHalf::Top => Bounds::new(b.x_min, b.x_max, b.y_max - height, b.y_max),
        };
        Self::new(bounds, Resolution::new(nx, ny))
    }

    #[must_use]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    #[must_use]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.nx, self.ny)
    }

    #[must_use]
    pub fn nx(&self) -> usize {
        self.nx
    }

    #[must_use]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Matrix shape `(rows, columns) = (ny, nx)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn dx(&self) -> f64 {
        self.bounds.width() / self.nx as f64
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn dy(&self) -> f64 {
        self.bounds.height() / self.ny as f64
    }

    #[must_use]
    pub fn cell_area(&self) -> f64 {
        self.dx() * self.dy()
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn x_samples(&self) -> Vec<f64> {
        let dx = self.dx();
        (0..self.nx)
            .map(|i| self.bounds.x_min + (i as f64 + 0.5) * dx)
            .collect()
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn y_samples(&self) -> Vec<f64> {
        let dy = self.dy();
        (0..self.ny)
            .map(|j| self.bounds.y_min + (j as f64 + 0.5) * dy)
            .collect()
    }

    /// Position of the sample in column `i`, row `j`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sample(&self, i: usize, j: usize) -> Point2 {
        Point2::new(
            self.bounds.x_min + (i as f64 + 0.5) * self.dx(),
            self.bounds.y_min + (j as f64 + 0.5) * self.dy(),
        )
    }

    /// Returns `true` if `other` lies within the grid extent.
    #[must_use]
    pub fn encloses(&self, other: &Bounds) -> bool {
        self.bounds.encloses(other)
    }
}

/// Union of the bounds of every non-empty shape.
pub(crate) fn geometry_bounds(shapes: &[&Shape]) -> Result<Bounds> {
    shapes
        .iter()
        .filter_map(|s| s.bounds())
        .reduce(|a, b| a.union(&b))
        .ok_or_else(|| GeometryError::Degenerate("no geometry to size the grid".into()).into())
}
