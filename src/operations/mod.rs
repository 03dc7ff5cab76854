pub mod boolean;

pub use boolean::{union_all, Boolean, BooleanKind};
