use super::Point2;

/// An axis-aligned bounding box in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    /// Smallest x coordinate.
    pub x_min: f64,
    /// Largest x coordinate.
    pub x_max: f64,
    /// Smallest y coordinate.
    pub y_min: f64,
    /// Largest y coordinate.
    pub y_max: f64,
}

impl Bounds {
    /// Creates bounds from explicit extents.
    #[must_use]
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Smallest bounds containing every point, or `None` for an empty iterator.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self::new(p.x, p.x, p.y, p.y),
                Some(b) => Self::new(
                    b.x_min.min(p.x),
                    b.x_max.max(p.x),
                    b.y_min.min(p.y),
                    b.y_max.max(p.y),
                ),
            })
        })
    }

    /// Smallest bounds containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.x_min.min(other.x_min),
            self.x_max.max(other.x_max),
            self.y_min.min(other.y_min),
            self.y_max.max(other.y_max),
        )
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Length of the diagonal, used as the scale of relative tolerances.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.width().hypot(self.height())
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        Point2::new(
            0.5 * (self.x_min + self.x_max),
            0.5 * (self.y_min + self.y_max),
        )
    }

    /// Returns `true` if `other` lies entirely inside these bounds.
    #[must_use]
    pub fn encloses(&self, other: &Self) -> bool {
        other.x_min >= self.x_min
            && other.x_max <= self.x_max
            && other.y_min >= self.y_min
            && other.y_max <= self.y_max
    }

    /// Bounds with both spans scaled by `factor` around the same center.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let c = self.center();
        let hw = 0.5 * self.width() * factor;
        let hh = 0.5 * self.height() * factor;
        Self::new(c.x - hw, c.x + hw, c.y - hh, c.y + hh)
    }
}
