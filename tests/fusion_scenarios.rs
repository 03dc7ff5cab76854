#![allow(clippy::unwrap_used)]

use std::f64::consts::PI;

use approx::assert_relative_eq;
use fiberfuse::error::{ConnectionError, GridError, ProfileError};
use fiberfuse::fusion::{ConnectionOptimizer, FiberSpec, FusedStructure, FusionConfig, Layout};
use fiberfuse::geometry::{Circle, Shape};
use fiberfuse::grid::{BoundsPolicy, CoordinateSystem, Resolution};
use fiberfuse::math::{Bounds, Point2};
use fiberfuse::operations::union_all;
use fiberfuse::profile::{Geometry, Layer, Profile};
use fiberfuse::FiberFuseError;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

fn fiber() -> FiberSpec {
    FiberSpec::new(1.0, 1.444).with_core(0.1, 1.4504)
}

fn pair(distance: f64, degree: f64) -> FusedStructure {
    let mut s = FusedStructure::new(FusionConfig::default())
        .try_with_fusion_degree(degree)
        .unwrap();
    s.add_fiber(&fiber(), Point2::new(0.0, 0.0)).unwrap();
    s.add_fiber(&fiber(), Point2::new(distance, 0.0)).unwrap();
    s
}

fn hexagonal_bundle(degree: f64) -> FusedStructure {
    let mut s = FusedStructure::default()
        .try_with_fusion_degree(degree)
        .unwrap();
    s.add_structure(&Layout::ring(6), &fiber()).unwrap();
    s.add_fiber(&fiber(), Point2::origin()).unwrap();
    s
}

fn triangle(side: f64, degree: f64) -> FusedStructure {
    let mut s = FusedStructure::default()
        .try_with_fusion_degree(degree)
        .unwrap();
    s.add_structure(&Layout::ring(3).with_scale(side / 2.0), &fiber())
        .unwrap();
    s
}

#[test]
fn separated_pair_fuses_at_half_degree() {
    init_tracing();
    let s = pair(2.5, 0.5);
    let connection = s.connections().values().next().unwrap();
    assert!(!connection.is_empty());
    assert!(s.is_fully_fused());
    assert_eq!(s.boundary().len(), 1);
}

#[test]
fn zero_degree_is_union_of_claddings() {
    init_tracing();
    let s = pair(2.5, 0.0);
    assert!(s.connections().is_empty());
    assert_eq!(s.component_count(), 2);
    let claddings = union_all(
        &[
            Shape::Circle(Circle::new(Point2::origin(), 1.0).unwrap()),
            Shape::Circle(Circle::new(Point2::new(2.5, 0.0), 1.0).unwrap()),
        ],
        1e-9,
    );
    assert_relative_eq!(s.outline().area(), claddings.area(), max_relative = 1e-12);
    assert!(s.outline().symmetric_difference(&claddings).area() < 1e-9);
}

#[test]
fn triangle_of_side_2_1_closes_at_0_8() {
    init_tracing();
    let s = triangle(2.1, 0.8);
    let side = (s.centers()[1] - s.centers()[0]).norm();
    assert_relative_eq!(side, 2.1, epsilon = 1e-12);
    assert_eq!(s.connections().len(), 3);
    assert!(s.is_fully_fused());
    let rings = s.boundary();
    assert_eq!(rings.len(), 1);
    assert!(rings[0].holes.is_empty());
    assert_eq!(s.outline().hole_count(), 0);
}

#[test]
fn added_area_grows_with_degree() {
    init_tracing();
    let mut s = triangle(2.1, 0.0);
    let mut previous = s.added_area();
    for step in 1..=10 {
        s.set_fusion_degree(f64::from(step) / 10.0).unwrap();
        let added = s.added_area();
        assert!(added >= previous - 1e-9, "step {step}: {added} < {previous}");
        previous = added;
    }
}

#[test]
fn hexagonal_bundle_fuses_up_to_full_degree() {
    init_tracing();
    let mut previous = 0.0;
    for degree in [0.9, 0.95, 0.99, 1.0] {
        let s = hexagonal_bundle(degree);
        assert_eq!(s.len(), 7);
        assert_eq!(s.connections().len(), 12, "degree {degree}");
        assert!(s.is_fully_fused(), "degree {degree}");
        for connection in s.connections().values() {
            assert!(connection.area() <= connection.limit_area() * (1.0 + 1e-9));
        }
        let added = s.added_area();
        assert!(added >= previous - 1e-9, "degree {degree}: {added} < {previous}");
        previous = added;
    }
    assert_eq!(hexagonal_bundle(1.0).outline().hole_count(), 0);
}

#[test]
fn raising_the_degree_in_place_matches_a_fresh_build() {
    init_tracing();
    let mut s = hexagonal_bundle(0.5);
    s.set_fusion_degree(0.95).unwrap();
    let fresh = hexagonal_bundle(0.95);
    assert_relative_eq!(s.outline().area(), fresh.outline().area(), max_relative = 1e-12);
    assert_eq!(s.connections().len(), fresh.connections().len());
}

#[test]
fn full_bounds_hug_the_fused_outline() {
    init_tracing();
    let s = hexagonal_bundle(0.6);
    let outline = s.outline().bounds().unwrap();
    let cs = CoordinateSystem::build(&BoundsPolicy::Full, Resolution::square(64), &[s.outline()])
        .unwrap();
    assert_eq!(*cs.bounds(), outline);
    assert_eq!(cs.resolution(), Resolution::square(64));
    assert_relative_eq!(outline.y_max, 3.0, epsilon = 1e-3);
}

#[test]
fn centering_bounds_surround_the_fused_outline() {
    init_tracing();
    let s = hexagonal_bundle(0.6);
    let cs = CoordinateSystem::build(
        &BoundsPolicy::Centering {
            padding: 1.2,
            include_center: true,
        },
        Resolution::square(64),
        &[s.outline()],
    )
    .unwrap();
    assert_eq!(cs.resolution(), Resolution::square(65));
    assert!(cs.encloses(&s.outline().bounds().unwrap()));
    let b = cs.bounds();
    assert_relative_eq!(b.width(), b.height(), max_relative = 1e-12);
    assert_relative_eq!(b.y_max, 3.6, epsilon = 1e-3);
    // The middle sample sits on the bundle centroid.
    let c = s.outline().centroid().unwrap();
    let mid = cs.sample(32, 32);
    assert!((mid - c).norm() < 1e-9);
}

#[test]
fn union_order_does_not_matter() {
    init_tracing();
    let s = triangle(2.1, 0.6);
    let mut parts: Vec<Shape> = s
        .fibers()
        .map(|(_, f)| Shape::Circle(f.clad().clone()))
        .collect();
    parts.extend(s.connections().values().map(|c| c.bridge().clone()));

    let forward = union_all(&parts, 1e-9);
    parts.reverse();
    let backward = union_all(&parts, 1e-9);
    parts.rotate_left(2);
    let rotated = union_all(&parts, 1e-9);

    for other in [&backward, &rotated] {
        assert_relative_eq!(forward.area(), other.area(), max_relative = 1e-6);
        assert_eq!(forward.component_count(), other.component_count());
        assert!(forward.symmetric_difference(other).area() < 1e-6 * forward.area());
    }
}

#[test]
fn translation_round_trip_restores_boundary() {
    init_tracing();
    let mut s = triangle(2.1, 0.5);
    let before = s.boundary();
    s.translate(12.5, -7.25);
    s.translate(-12.5, 7.25);
    let after = s.boundary();
    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.exterior.len(), b.exterior.len());
        for (p, q) in a.exterior.iter().zip(&b.exterior) {
            assert!((p - q).norm() < 1e-9);
        }
    }
}

#[test]
fn unit_circle_rasterizes_to_its_area() {
    init_tracing();
    let cs = CoordinateSystem::new(Bounds::new(-5.0, 5.0, -5.0, 5.0), Resolution::square(100))
        .unwrap();
    let mask = cs.rasterize(&Shape::Circle(Circle::new(Point2::origin(), 1.0).unwrap()));
    let count = mask.iter().filter(|v| **v).count();
    // 0.1 x 0.1 cells
    let expected = PI * 100.0;
    #[allow(clippy::cast_precision_loss)]
    let error = (count as f64 - expected).abs() / expected;
    assert!(error < 0.02, "count {count}");
}

#[test]
fn rasterization_is_bit_identical() {
    init_tracing();
    let s = triangle(2.1, 0.7);
    let cs = CoordinateSystem::build(&BoundsPolicy::default(), Resolution::square(80), &[s.outline()])
        .unwrap();
    assert_eq!(cs.rasterize(s.outline()), cs.rasterize(s.outline()));
}

#[test]
fn full_pipeline_produces_index_map() {
    init_tracing();
    let s = pair(2.2, 0.6);
    let mut profile = Profile::new(1.0);
    profile.add_structure(&s);
    let map = Geometry::new(&profile, BoundsPolicy::default(), Resolution::square(121))
        .build()
        .unwrap();
    assert_eq!(map.coordinates().shape(), (121, 121));
    let (lo, hi) = map.index_range();
    assert_relative_eq!(lo, 1.0);
    assert_relative_eq!(hi, 1.4504);
    let gradient = map.rho_gradient();
    assert_eq!(gradient.shape(), (121, 121));
    assert!(gradient.iter().any(|g| g.abs() > 0.0));
}

#[test]
fn invalid_resolution_is_reported() {
    let err = CoordinateSystem::new(Bounds::new(-1.0, 1.0, -1.0, 1.0), Resolution::square(1))
        .unwrap_err();
    assert!(matches!(
        err,
        FiberFuseError::Grid(GridError::InvalidResolution { nx: 1, ny: 1 })
    ));
}

#[test]
fn contained_cladding_has_no_connection() {
    let outer = Circle::new(Point2::origin(), 3.0).unwrap();
    let inner = Circle::new(Point2::new(0.5, 0.5), 1.0).unwrap();
    let err = ConnectionOptimizer::new(&outer, &inner, 0.5)
        .execute()
        .unwrap_err();
    assert!(matches!(
        err,
        FiberFuseError::Connection(ConnectionError::NoValidConnection { .. })
    ));
}

#[test]
fn coincident_layers_without_precedence_are_rejected() {
    let disc = Shape::Circle(Circle::new(Point2::origin(), 1.0).unwrap());
    let mut profile = Profile::new(1.0);
    profile
        .add_layer(Layer::new("clad", disc.clone(), 1.444))
        .add_layer(Layer::new("doped clad", disc, 1.446));
    let err = Geometry::new(&profile, BoundsPolicy::Full, Resolution::square(32))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        FiberFuseError::Profile(ProfileError::LayerOverlapAmbiguity { .. })
    ));
}
