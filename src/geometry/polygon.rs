use geo::{Area, Centroid, Contains, ConvexHull, MultiPolygon};

use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::{dedup_ring, oriented, rotate_to_canonical_start, signed_area_2d};
use crate::math::{Bounds, Point2, TOLERANCE};

/// One connected component of a region: an outer boundary and its holes.
///
/// Exteriors are counter-clockwise, holes clockwise, and every ring starts at
/// its leftmost vertex. Rings are open (the first point is not repeated).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ring {
    pub exterior: Vec<Point2>,
    pub holes: Vec<Vec<Point2>>,
}

impl Ring {
    /// Area enclosed by the exterior minus the holes.
    #[must_use]
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| signed_area_2d(h).abs()).sum();
        signed_area_2d(&self.exterior).abs() - holes
    }
}

/// A planar region made of zero or more disjoint components, each of which may
/// carry holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    inner: MultiPolygon<f64>,
}

impl Default for Polygon {
    fn default() -> Self {
        Self {
            inner: MultiPolygon::new(vec![]),
        }
    }
}

impl Polygon {
    /// Creates a polygon from an exterior ring and optional holes.
    ///
    /// Orientation of the input does not matter.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the exterior has fewer than three
    /// distinct points or encloses no area.
    pub fn new(exterior: &[Point2], holes: &[Vec<Point2>]) -> Result<Self> {
        let scale = Bounds::from_points(exterior).map_or(1.0, |b| b.diagonal().max(1.0));
        let outer = dedup_ring(exterior, TOLERANCE * scale);
        if outer.len() < 3 {
            return Err(GeometryError::Degenerate(format!(
                "polygon exterior needs at least 3 distinct points, got {}",
                outer.len()
            ))
            .into());
        }
        if signed_area_2d(&outer).abs() <= TOLERANCE * scale * scale {
            return Err(GeometryError::Degenerate("polygon exterior has zero area".into()).into());
        }
        let holes: Vec<Vec<Point2>> = holes
            .iter()
            .map(|h| dedup_ring(h, TOLERANCE * scale))
            .filter(|h| h.len() >= 3)
            .map(|h| oriented(h, false))
            .collect();
        Ok(Self::from_geo(MultiPolygon::new(vec![to_geo_polygon(
            &oriented(outer, true),
            &holes,
        )])))
    }

    /// The empty region.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps a single ring the caller knows to be valid (e.g. a sampled circle).
    pub(crate) fn from_ring_unchecked(exterior: Vec<Point2>) -> Self {
        Self::from_geo(MultiPolygon::new(vec![to_geo_polygon(&exterior, &[])]))
    }

    /// Wraps a `geo` multipolygon.
    #[must_use]
    pub fn from_geo(inner: MultiPolygon<f64>) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn as_geo(&self) -> &MultiPolygon<f64> {
        &self.inner
    }

    #[must_use]
    pub fn into_geo(self) -> MultiPolygon<f64> {
        self.inner
    }

    /// Returns `true` if the region has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.0.is_empty()
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.inner.unsigned_area()
    }

    /// Number of disjoint components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.inner.0.len()
    }

    /// Total number of holes across all components.
    #[must_use]
    pub fn hole_count(&self) -> usize {
        self.inner.0.iter().map(|p| p.interiors().len()).sum()
    }

    /// Axis-aligned bounds, or `None` for the empty region.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        let points: Vec<Point2> = self
            .inner
            .0
            .iter()
            .flat_map(|p| p.exterior().coords())
            .map(|c| Point2::new(c.x, c.y))
            .collect();
        Bounds::from_points(&points)
    }

    /// Area-weighted centroid, or `None` for the empty region.
    #[must_use]
    pub fn centroid(&self) -> Option<Point2> {
        self.inner.centroid().map(|c| Point2::new(c.x(), c.y()))
    }

    /// Interior test; points on the boundary are outside.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        self.inner.contains(&geo::Point::new(p.x, p.y))
    }

    /// Convex hull of all components.
    #[must_use]
    pub fn convex_hull(&self) -> Self {
        if self.is_empty() {
            return Self::empty();
        }
        Self::from_geo(MultiPolygon::new(vec![self.inner.convex_hull()]))
    }

    /// Boundary rings in canonical orientation and start vertex.
    #[must_use]
    pub fn rings(&self) -> Vec<Ring> {
        self.inner
            .0
            .iter()
            .map(|p| Ring {
                exterior: canonical(ring_points(p.exterior()), true),
                holes: p
                    .interiors()
                    .iter()
                    .map(|h| canonical(ring_points(h), false))
                    .collect(),
            })
            .collect()
    }

    /// Returns a copy with near-duplicate vertices merged and sliver rings
    /// removed.
    ///
    /// `epsilon` is an absolute length. Rings that collapse to fewer than three
    /// points or enclose less than `epsilon * scale` of area are dropped, where
    /// `scale` is the bounding-box diagonal.
    #[must_use]
    pub fn cleaned(&self, epsilon: f64) -> Self {
        let scale = self.bounds().map_or(0.0, |b| b.diagonal());
        let min_area = (epsilon * scale).max(epsilon * epsilon);
        let keep = |ring: &geo::LineString<f64>| -> Option<Vec<Point2>> {
            let pts = dedup_ring(&ring_points(ring), epsilon);
            (pts.len() >= 3 && signed_area_2d(&pts).abs() > min_area).then_some(pts)
        };
        let polygons = self
            .inner
            .0
            .iter()
            .filter_map(|p| {
                let exterior = keep(p.exterior())?;
                let holes: Vec<Vec<Point2>> = p
                    .interiors()
                    .iter()
                    .filter_map(keep)
                    .map(|h| oriented(h, false))
                    .collect();
                Some(to_geo_polygon(&oriented(exterior, true), &holes))
            })
            .collect();
        Self::from_geo(MultiPolygon::new(polygons))
    }
}

fn ring_points(ring: &geo::LineString<f64>) -> Vec<Point2> {
    let mut pts: Vec<Point2> = ring.coords().map(|c| Point2::new(c.x, c.y)).collect();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    pts
}

fn canonical(points: Vec<Point2>, ccw: bool) -> Vec<Point2> {
    rotate_to_canonical_start(&oriented(points, ccw))
}

pub(crate) fn to_geo_polygon(exterior: &[Point2], holes: &[Vec<Point2>]) -> geo::Polygon<f64> {
    let line = |pts: &[Point2]| -> geo::LineString<f64> {
        pts.iter()
            .map(|p| geo::Coord { x: p.x, y: p.y })
            .collect::<Vec<_>>()
            .into()
    };
    geo::Polygon::new(line(exterior), holes.iter().map(|h| line(h)).collect())
}
