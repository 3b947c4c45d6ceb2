//! mainfiles - collect the main files of a project's dependencies
//!
//! This crate reads a package.json, walks its declared dependencies
//! (transitively, through each dependency's own package.json) and returns
//! one list of main files, ready to be copied into a distribution folder.

pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities for mainfiles unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides temporary on-disk project fixtures.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    group::GroupSelector, manifest::Manifest, package::PackageEntry, package::PackageOverride,
};

pub use ops::{collect_files, collect_files_then, CollectOptions, FileFilter};
pub use resolver::{CollectError, DependencyGraph, IncludeDev};
