//! Dependency graph construction and the resolution worklist.

pub mod errors;
pub mod graph;

pub use errors::CollectError;
pub use graph::{Collected, DependencyGraph, GraphConfig, IncludeDev};
