use thiserror::Error;

/// Top-level error type for the fusion engine.
#[derive(Debug, Error)]
pub enum FiberFuseError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("entity not found: {0}")]
    EntityNotFound(String),
}

/// Positional indices of the two fibers of a pair, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairIndices(pub usize, pub usize);

impl std::fmt::Display for PairIndices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fibers {} and {}", self.0, self.1)
    }
}

fn pair_label(pair: Option<&PairIndices>) -> String {
    pair.map_or_else(|| "the given claddings".to_owned(), |p| p.to_string())
}

/// Errors raised while constructing the bridge between two claddings.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("no valid connection for {} at fusion degree {degree}: {reason}", pair_label(.pair.as_ref()))]
    NoValidConnection {
        degree: f64,
        pair: Option<PairIndices>,
        reason: String,
    },
}

impl ConnectionError {
    /// Attaches the caller's fiber indices to an error raised without them.
    #[must_use]
    pub fn with_pair(self, indices: PairIndices) -> Self {
        match self {
            Self::NoValidConnection { degree, reason, .. } => Self::NoValidConnection {
                degree,
                pair: Some(indices),
                reason,
            },
        }
    }
}

/// Errors related to sampling grids.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("invalid resolution {nx}x{ny}: each axis needs at least 2 samples")]
    InvalidResolution { nx: usize, ny: usize },

    #[error("invalid bounds: {axis} span [{min}, {max}] must be finite and strictly positive")]
    InvalidBounds {
        axis: &'static str,
        min: f64,
        max: f64,
    },
}

/// Errors raised while assembling a layered index profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("layers '{first}' and '{second}' coincide but their precedence is not specified")]
    LayerOverlapAmbiguity { first: String, second: String },
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("tessellation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`FiberFuseError`].
pub type Result<T> = std::result::Result<T, FiberFuseError>;
