//! High-level operations.
//!
//! This module contains the implementation of mainfiles commands.

pub mod collect;
pub mod filter;

pub use collect::{
    build_graph, collect_files, collect_files_then, CollectOptions, CollectPaths, ResolvedPaths,
};
pub use filter::FileFilter;
