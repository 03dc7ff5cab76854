use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use slotmap::SlotMap;
use tracing::{debug, info};

use crate::error::{FiberFuseError, GeometryError, PairIndices, Result};
use crate::geometry::{Ring, Shape};
use crate::math::distance_2d::point_to_segment_dist;
use crate::math::{Point2, Vector2, TOLERANCE};
use crate::operations::boolean::union_all;
use crate::profile::Layer;

use super::connection::{Connection, ConnectionOptimizer};
use super::core_placement::CorePlacement;
use super::fiber::{FiberId, FiberSpec, FiberUnit};
use super::layout::Layout;
use super::law::{validate_degree, CenteringPolicy, FusionConfig, Topology};

/// Unordered pair of fibers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FiberPair(FiberId, FiberId);

impl FiberPair {
    /// Creates the pair, ordering the ids.
    #[must_use]
    pub fn new(a: FiberId, b: FiberId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    #[must_use]
    pub fn first(&self) -> FiberId {
        self.0
    }

    #[must_use]
    pub fn second(&self) -> FiberId {
        self.1
    }
}

/// One edge of the adjacency graph, ready for the optimizer.
struct EdgeJob {
    pair: FiberPair,
    indices: PairIndices,
    topology: Topology,
}

/// Result of one fusion pass before it is committed.
struct FusionState {
    connections: BTreeMap<FiberPair, Connection>,
    outline: Shape,
    cladding_area: f64,
}

/// A set of fibers fused at a common degree.
///
/// The outline (claddings plus bridges) is recomputed from scratch whenever a
/// fiber is added or the degree changes. A failed pass leaves the structure
/// as it was.
#[derive(Debug, Clone)]
pub struct FusedStructure {
    fibers: SlotMap<FiberId, FiberUnit>,
    order: Vec<FiberId>,
    degree: f64,
    config: FusionConfig,
    connections: BTreeMap<FiberPair, Connection>,
    outline: Shape,
    /// Area of the union of the claddings alone.
    cladding_area: f64,
}

impl Default for FusedStructure {
    fn default() -> Self {
        Self::new(FusionConfig::default())
    }
}

impl FusedStructure {
    /// Creates an empty structure at fusion degree 0.
    #[must_use]
    pub fn new(config: FusionConfig) -> Self {
        Self {
            fibers: SlotMap::with_key(),
            order: Vec::new(),
            degree: 0.0,
            config,
            connections: BTreeMap::new(),
            outline: Shape::empty(),
            cladding_area: 0.0,
        }
    }

    /// Builder form of [`FusedStructure::set_fusion_degree`].
    ///
    /// # Errors
    ///
    /// - `GeometryError::ParameterOutOfRange` if `degree` is outside `[0, 1]`
    /// - any error of the fusion pass over fibers already present
    pub fn try_with_fusion_degree(mut self, degree: f64) -> Result<Self> {
        self.set_fusion_degree(degree)?;
        Ok(self)
    }

    #[must_use]
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    #[must_use]
    pub fn fusion_degree(&self) -> f64 {
        self.degree
    }

    /// Adds a fiber centred at `center` and re-runs the fusion.
    ///
    /// # Errors
    ///
    /// Returns an error if the fiber is degenerate or the fusion fails; the
    /// structure is left unchanged in that case.
    pub fn add_fiber(&mut self, spec: &FiberSpec, center: Point2) -> Result<FiberId> {
        let ids = self.insert_and_fuse(spec, &[center])?;
        ids.into_iter()
            .next()
            .ok_or_else(|| GeometryError::Degenerate("no fiber inserted".into()).into())
    }

    /// Adds identical fibers placed by `layout` and re-runs the fusion once.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout or a fiber is degenerate or the fusion
    /// fails; the structure is left unchanged in that case.
    pub fn add_structure(&mut self, layout: &Layout, spec: &FiberSpec) -> Result<Vec<FiberId>> {
        let centers = layout.centers(spec.clad_radius)?;
        self.insert_and_fuse(spec, &centers)
    }

    /// Changes the fusion degree and re-runs the fusion.
    ///
    /// # Errors
    ///
    /// - `GeometryError::ParameterOutOfRange` if `degree` is outside `[0, 1]`
    /// - any error of the fusion pass; the previous degree is kept
    pub fn set_fusion_degree(&mut self, degree: f64) -> Result<()> {
        let degree = validate_degree(degree)?;
        let previous = self.degree;
        self.degree = degree;
        if let Err(err) = self.refuse() {
            self.degree = previous;
            return Err(err);
        }
        Ok(())
    }

    fn insert_and_fuse(&mut self, spec: &FiberSpec, centers: &[Point2]) -> Result<Vec<FiberId>> {
        let units = centers
            .iter()
            .map(|c| spec.place(*c, self.config.discretization))
            .collect::<Result<Vec<_>>>()?;
        let ids: Vec<FiberId> = units
            .into_iter()
            .map(|unit| {
                let id = self.fibers.insert(unit);
                self.order.push(id);
                id
            })
            .collect();
        if let Err(err) = self.refuse() {
            for id in &ids {
                self.fibers.remove(*id);
            }
            self.order.truncate(self.order.len() - ids.len());
            return Err(err);
        }
        Ok(ids)
    }

    /// Recomputes connections and outline, committing only on success.
    fn refuse(&mut self) -> Result<()> {
        let state = self.fuse()?;
        self.connections = state.connections;
        self.outline = state.outline;
        self.cladding_area = state.cladding_area;
        info!(
            fibers = self.order.len(),
            edges = self.connections.len(),
            components = self.outline.component_count(),
            degree = self.degree,
            "fusion pass"
        );
        if self.config.centering == CenteringPolicy::Origin {
            self.recenter();
        }
        Ok(())
    }

    fn fuse(&self) -> Result<FusionState> {
        let jobs = self.edge_jobs();
        let solved = self.solve_edges(&jobs)?;
        let connections: BTreeMap<FiberPair, Connection> = jobs
            .iter()
            .map(|job| job.pair)
            .zip(solved)
            .collect();

        let claddings: Vec<Shape> = self
            .order
            .iter()
            .filter_map(|id| self.fibers.get(*id))
            .map(|f| Shape::Circle(f.clad().clone()))
            .collect();
        let cladding_union = union_all(&claddings, self.config.dedup_epsilon);
        let outline = if connections.is_empty() {
            cladding_union.clone()
        } else {
            union_all(
                std::iter::once(&cladding_union)
                    .chain(connections.values().map(Connection::bridge)),
                self.config.dedup_epsilon,
            )
        };
        Ok(FusionState {
            connections,
            outline,
            cladding_area: cladding_union.area(),
        })
    }

    #[cfg(feature = "parallel")]
    fn solve_edges(&self, jobs: &[EdgeJob]) -> Result<Vec<Connection>> {
        jobs.par_iter().map(|job| self.solve_edge(job)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn solve_edges(&self, jobs: &[EdgeJob]) -> Result<Vec<Connection>> {
        jobs.iter().map(|job| self.solve_edge(job)).collect()
    }

    fn solve_edge(&self, job: &EdgeJob) -> Result<Connection> {
        let (a, b) = (self.fiber(job.pair.first())?, self.fiber(job.pair.second())?);
        let connection = ConnectionOptimizer::new(a.clad(), b.clad(), self.degree)
            .with_topology(job.topology)
            .with_config(&self.config)
            .execute()
            .map_err(|err| match err {
                FiberFuseError::Connection(e) => FiberFuseError::Connection(e.with_pair(job.indices)),
                other => other,
            })?;
        debug!(
            pair = %job.indices,
            neighbors = job.topology.neighbors,
            area = connection.area(),
            "pair connected"
        );
        Ok(connection)
    }

    /// Pairs within the influence radius, with their common-neighbour counts.
    fn edge_jobs(&self) -> Vec<EdgeJob> {
        let edges = self.adjacency_indices();
        let mut neighbours: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); self.order.len()];
        for &(i, j) in &edges {
            neighbours[i].insert(j);
            neighbours[j].insert(i);
        }
        edges
            .into_iter()
            .map(|(i, j)| EdgeJob {
                pair: FiberPair::new(self.order[i], self.order[j]),
                indices: PairIndices(i, j),
                topology: Topology::junction(neighbours[i].intersection(&neighbours[j]).count()),
            })
            .collect()
    }

    /// Pairs within the influence radius whose line of centres does not
    /// meet a third cladding.
    fn adjacency_indices(&self) -> Vec<(usize, usize)> {
        if self.degree <= 0.0 {
            return Vec::new();
        }
        let fibers: Vec<&FiberUnit> = self
            .order
            .iter()
            .filter_map(|id| self.fibers.get(*id))
            .collect();
        let mut edges = Vec::new();
        for (i, a) in fibers.iter().enumerate() {
            for (j, b) in fibers.iter().enumerate().skip(i + 1) {
                let gap = (b.center() - a.center()).norm() - a.radius() - b.radius();
                if gap > self.config.influence_gap(self.degree, a.radius(), b.radius()) {
                    continue;
                }
                let occluded = fibers.iter().enumerate().any(|(k, c)| {
                    k != i && k != j && occludes(c, a.center(), b.center())
                });
                if !occluded {
                    edges.push((i, j));
                }
            }
        }
        edges
    }

    /// Unordered adjacent pairs at the current degree. Empty at degree 0.
    #[must_use]
    pub fn adjacency(&self) -> Vec<FiberPair> {
        self.adjacency_indices()
            .into_iter()
            .map(|(i, j)| FiberPair::new(self.order[i], self.order[j]))
            .collect()
    }

    /// Looks up a fiber.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::EntityNotFound` for an unknown id.
    pub fn fiber(&self, id: FiberId) -> Result<&FiberUnit> {
        self.fibers
            .get(id)
            .ok_or_else(|| GeometryError::EntityNotFound(format!("fiber {id:?}")).into())
    }

    /// Fibers in insertion order.
    pub fn fibers(&self) -> impl Iterator<Item = (FiberId, &FiberUnit)> {
        self.order
            .iter()
            .filter_map(|id| self.fibers.get(*id).map(|f| (*id, f)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Cladding centres in insertion order.
    #[must_use]
    pub fn centers(&self) -> Vec<Point2> {
        self.fibers().map(|(_, f)| *f.center()).collect()
    }

    /// Core centres in insertion order, for fibers that have a core.
    #[must_use]
    pub fn core_centers(&self) -> Vec<Point2> {
        self.fibers()
            .filter_map(|(_, f)| f.core_center().copied())
            .collect()
    }

    #[must_use]
    pub fn connections(&self) -> &BTreeMap<FiberPair, Connection> {
        &self.connections
    }

    /// Union of claddings and bridges.
    #[must_use]
    pub fn outline(&self) -> &Shape {
        &self.outline
    }

    #[must_use]
    pub fn boundary(&self) -> Vec<Ring> {
        self.outline.boundary()
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.outline.component_count()
    }

    /// `true` when the outline is a single connected region.
    #[must_use]
    pub fn is_fully_fused(&self) -> bool {
        self.outline.component_count() == 1
    }

    /// Area the bridges add to the union of the claddings.
    #[must_use]
    pub fn added_area(&self) -> f64 {
        (self.outline.area() - self.cladding_area).max(0.0)
    }

    /// Cladding area lost to overlaps between fibers.
    #[must_use]
    pub fn removed_area(&self) -> f64 {
        let claddings: f64 = self
            .fibers()
            .map(|(_, f)| f.clad().to_polygon().area())
            .sum();
        (claddings - self.cladding_area).max(0.0)
    }

    /// Moves every fiber, bridge and the outline.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let offset = Vector2::new(dx, dy);
        for fiber in self.fibers.values_mut() {
            fiber.translate(&offset);
        }
        for connection in self.connections.values_mut() {
            *connection = connection.translated(dx, dy);
        }
        self.outline = self.outline.translate(dx, dy);
    }

    /// Moves the structure so the outline centroid sits on the origin.
    pub fn recenter(&mut self) {
        if let Some(c) = self.outline.centroid() {
            self.translate(-c.x, -c.y);
        }
    }

    /// Offsets every core by a pseudo-random vector with components in
    /// `[0, magnitude)`. The same seed gives the same offsets.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` for a negative or
    /// non-finite magnitude.
    pub fn scramble_cores(&mut self, magnitude: f64, seed: u64) -> Result<()> {
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "magnitude",
                value: magnitude,
                min: 0.0,
                max: f64::INFINITY,
            }
            .into());
        }
        let mut rng = StdRng::seed_from_u64(seed);
        for id in &self.order {
            let offset = Vector2::new(
                rng.random::<f64>() * magnitude,
                rng.random::<f64>() * magnitude,
            );
            if let Some(fiber) = self.fibers.get_mut(*id) {
                fiber.set_core_offset(&offset);
            }
        }
        Ok(())
    }

    /// Moves every core along the lines of centres of its connections.
    ///
    /// Each connection contributes the offsets of [`CorePlacement`]; a fiber
    /// with several connections gets their sum. Fibers without a connection
    /// have their core recentred. Call again after changing the degree.
    ///
    /// # Errors
    ///
    /// Returns an error if a placement fails; no core is moved in that case.
    pub fn optimize_core_positions(&mut self) -> Result<()> {
        let mut offsets: BTreeMap<FiberId, Vector2> = BTreeMap::new();
        for (pair, connection) in &self.connections {
            let (a, b) = (self.fiber(pair.first())?, self.fiber(pair.second())?);
            let placed = CorePlacement::new(a.clad(), b.clad(), connection.bridge())
                .with_config(&self.config)
                .execute()?;
            *offsets.entry(pair.first()).or_insert_with(Vector2::zeros) += placed.first;
            *offsets.entry(pair.second()).or_insert_with(Vector2::zeros) += placed.second;
        }
        for (id, fiber) in &mut self.fibers {
            let offset = offsets.get(&id).copied().unwrap_or_else(Vector2::zeros);
            fiber.set_core_offset(&offset);
        }
        info!(connections = self.connections.len(), "core positions optimized");
        Ok(())
    }

    /// Profile layers: the fused cladding outline first, then one layer per
    /// core.
    ///
    /// The outline takes the cladding index of the first fiber. Cores carry
    /// precedence 1 so they always paint over the cladding.
    #[must_use]
    pub fn layers(&self) -> Vec<Layer> {
        let mut layers = Vec::with_capacity(self.len() + 1);
        if let Some((_, first)) = self.fibers().next() {
            layers.push(Layer::new("clad", self.outline.clone(), first.clad_index()));
        }
        for (position, (_, fiber)) in self.fibers().enumerate() {
            if let (Some(core), Some(index)) = (fiber.core(), fiber.core_index()) {
                layers.push(Layer::new(format!("core {position}"), core, index).with_precedence(1));
            }
        }
        layers
    }
}

/// `true` when the segment `a`-`b` passes through or touches `fiber`.
fn occludes(fiber: &FiberUnit, a: &Point2, b: &Point2) -> bool {
    let slack = TOLERANCE * (1.0 + (b - a).norm() + fiber.radius());
    point_to_segment_dist(fiber.center(), a, b) <= fiber.radius() + slack
}
