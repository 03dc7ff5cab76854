//! Bridge construction between claddings and composition of fused
//! structures.

pub mod connection;
pub mod core_placement;
pub mod fiber;
pub mod layout;
pub mod law;
pub mod structure;

pub use connection::{Connection, ConnectionOptimizer};
pub use core_placement::{CoreOffsets, CorePlacement};
pub use fiber::{FiberId, FiberSpec, FiberUnit};
pub use layout::{Arrangement, Layout};
pub use law::{CenteringPolicy, FusionConfig, FusionLaw, Topology};
pub use structure::{FiberPair, FusedStructure};
