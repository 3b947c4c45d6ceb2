//! Core data structures for mainfiles.
//!
//! - The project manifest and the dependency manifests it leads to
//! - Package entries and their main file resolution
//! - Group selectors

pub mod group;
pub mod manifest;
pub mod package;

pub use group::GroupSelector;
pub use manifest::{DependencyList, MainField, Manifest, ModuleManifest};
pub use package::{MainOverride, PackageEntry, PackageOverride, Resolution};
