//! Layered refractive-index profiles and their rasterization.

mod geometry;
mod index_map;
mod layer;

pub use geometry::Geometry;
pub use index_map::IndexMap;
pub use layer::Layer;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ProfileError, Result};
use crate::fusion::FusedStructure;
use crate::geometry::Shape;

/// Relative symmetric-difference area under which two layer shapes are
/// considered the same region.
pub const COINCIDENCE_TOLERANCE: f64 = 1e-6;

/// A background index plus an ordered list of layers, painted in order.
#[derive(Debug, Clone)]
pub struct Profile {
    background: f64,
    layers: Vec<Layer>,
}

impl Profile {
    /// Creates a profile with only a background index.
    #[must_use]
    pub fn new(background: f64) -> Self {
        Self {
            background,
            layers: Vec::new(),
        }
    }

    /// Appends a layer.
    pub fn add_layer(&mut self, layer: Layer) -> &mut Self {
        self.layers.push(layer);
        self
    }

    /// Appends the layers of a fused structure (outline, then cores).
    pub fn add_structure(&mut self, structure: &FusedStructure) -> &mut Self {
        self.layers.extend(structure.layers());
        self
    }

    #[must_use]
    pub fn background(&self) -> f64 {
        self.background
    }

    /// Layers in insertion order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Shapes of every layer.
    #[must_use]
    pub fn shapes(&self) -> Vec<&Shape> {
        self.layers.iter().map(Layer::shape).collect()
    }

    /// Smallest and largest index, background included.
    #[must_use]
    pub fn index_range(&self) -> (f64, f64) {
        self.layers
            .iter()
            .map(Layer::index)
            .fold((self.background, self.background), |(lo, hi), n| {
                (lo.min(n), hi.max(n))
            })
    }

    /// Layers in painting order: ascending precedence, insertion order among
    /// equals.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::LayerOverlapAmbiguity` when two layers with
    /// different indices cover the same region and their order is not fixed
    /// by explicit precedences.
    pub fn resolved_layers(&self) -> Result<Vec<&Layer>> {
        self.check_ambiguity()?;
        let mut ordered: Vec<&Layer> = self.layers.iter().collect();
        ordered.sort_by_key(|l| l.effective_precedence());
        Ok(ordered)
    }

    fn check_ambiguity(&self) -> Result<()> {
        for (i, a) in self.layers.iter().enumerate() {
            for b in &self.layers[i + 1..] {
                #[allow(clippy::float_cmp)]
                let same_index = a.index() == b.index();
                if same_index || order_is_fixed(a, b) {
                    continue;
                }
                if coincide(a.shape(), b.shape()) {
                    return Err(ProfileError::LayerOverlapAmbiguity {
                        first: a.name().to_owned(),
                        second: b.name().to_owned(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Copy with every layer index scaled by `1 + factor * u`, `u` drawn
    /// uniformly from `[0, 1)` with a seeded generator.
    #[must_use]
    pub fn with_index_scrambling(&self, factor: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            background: self.background,
            layers: self
                .layers
                .iter()
                .map(|l| l.with_index(l.index() * (1.0 + factor * rng.random::<f64>())))
                .collect(),
        }
    }
}

/// Whether at least one layer has an explicit precedence and the effective
/// values differ.
fn order_is_fixed(a: &Layer, b: &Layer) -> bool {
    (a.precedence().is_some() || b.precedence().is_some())
        && a.effective_precedence() != b.effective_precedence()
}

fn coincide(a: &Shape, b: &Shape) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let (Some(ba), Some(bb)) = (a.bounds(), b.bounds()) else {
        return false;
    };
    let slack = 1e-3 * ba.diagonal().max(bb.diagonal());
    let close = (ba.x_min - bb.x_min).abs() <= slack
        && (ba.x_max - bb.x_max).abs() <= slack
        && (ba.y_min - bb.y_min).abs() <= slack
        && (ba.y_max - bb.y_max).abs() <= slack;
    if !close {
        return false;
    }
    let scale = a.area().max(b.area());
    a.symmetric_difference(b).area() <= COINCIDENCE_TOLERANCE * scale
}
