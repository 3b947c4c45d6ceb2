//! The dependency graph: registration and the resolution worklist.
//!
//! Construction reads the manifest once, decides which dependencies take
//! part and registers one [`PackageEntry`] per unique name, pulling in each
//! entry's own dependencies transitively. Collection then drains a queue of
//! entries pass by pass. Entries that cannot resolve yet go back on the
//! queue; when a pass leaves the queue exactly as long as the previous one,
//! the next pass forces every remaining entry to resolve or fail.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::core::group::GroupSelector;
use crate::core::manifest::{DependencyList, MainField, Manifest, MODULE_DIR_NAME};
use crate::core::package::{PackageEntry, PackageOverride, Resolution};
use crate::resolver::errors::CollectError;

/// Which dependency sections take part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawIncludeDev")]
pub enum IncludeDev {
    /// Production dependencies only.
    #[default]
    Exclude,
    /// Production and development dependencies.
    Inclusive,
    /// Development dependencies only.
    Exclusive,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIncludeDev {
    Flag(bool),
    Mode(String),
}

impl From<RawIncludeDev> for IncludeDev {
    fn from(raw: RawIncludeDev) -> Self {
        match raw {
            RawIncludeDev::Flag(flag) => IncludeDev::from(flag),
            RawIncludeDev::Mode(mode) => IncludeDev::from_mode(&mode),
        }
    }
}

impl From<bool> for IncludeDev {
    fn from(flag: bool) -> Self {
        if flag {
            IncludeDev::Inclusive
        } else {
            IncludeDev::Exclude
        }
    }
}

impl IncludeDev {
    /// Any mode other than `exclusive` or an explicit false/empty value
    /// includes both sections.
    fn from_mode(mode: &str) -> Self {
        match mode.to_lowercase().as_str() {
            "exclusive" => IncludeDev::Exclusive,
            "" | "false" | "no" | "0" => IncludeDev::Exclude,
            _ => IncludeDev::Inclusive,
        }
    }

    fn includes_production(self) -> bool {
        self != IncludeDev::Exclusive
    }

    fn includes_development(self) -> bool {
        self != IncludeDev::Exclude
    }
}

impl FromStr for IncludeDev {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(IncludeDev::from_mode(s))
    }
}

impl fmt::Display for IncludeDev {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncludeDev::Exclude => write!(f, "false"),
            IncludeDev::Inclusive => write!(f, "inclusive"),
            IncludeDev::Exclusive => write!(f, "exclusive"),
        }
    }
}

/// Everything graph construction needs, with paths already resolved.
#[derive(Debug, Clone, Default)]
pub struct GraphConfig {
    /// The project manifest
    pub manifest_path: PathBuf,
    /// Shared module directory
    pub module_dir: PathBuf,
    pub include_dev: IncludeDev,
    /// Add the project's own main as the last entry
    pub include_self: bool,
    /// Caller overrides; these shadow manifest overrides of the same name
    pub overrides: IndexMap<String, PackageOverride>,
    pub group: Option<GroupSelector>,
    /// Environment used to pick environment-keyed override mains
    pub env: Option<String>,
    /// Log every registration
    pub debugging: bool,
}

/// Result of a collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    /// All contributed files, first-resolved first.
    pub files: Vec<PathBuf>,
    /// Package names in the order they contributed.
    pub order: Vec<String>,
    /// Number of passes over the queue.
    pub passes: usize,
}

/// The set of entries to collect files from.
#[derive(Debug)]
pub struct DependencyGraph {
    module_dir: PathBuf,
    env: Option<String>,
    debugging: bool,
    overrides: IndexMap<String, PackageOverride>,
    packages: IndexMap<String, PackageEntry>,
}

impl DependencyGraph {
    /// Build the graph from the manifest.
    ///
    /// A missing manifest or an undeclared group is an error. A manifest
    /// that cannot be read or parsed is logged and yields an empty graph.
    pub fn new(config: GraphConfig) -> Result<Self, CollectError> {
        let GraphConfig {
            manifest_path,
            module_dir,
            include_dev,
            include_self,
            overrides,
            group,
            env,
            debugging,
        } = config;

        let mut graph = DependencyGraph {
            module_dir,
            env,
            debugging,
            overrides: IndexMap::new(),
            packages: IndexMap::new(),
        };

        let manifest = match Manifest::load(&manifest_path) {
            Ok(manifest) => manifest,
            Err(e @ (CollectError::ManifestParse { .. } | CollectError::ManifestRead { .. })) => {
                tracing::error!("{}", e);
                graph.overrides = overrides;
                return Ok(graph);
            }
            Err(e) => return Err(e),
        };

        let mut effective = manifest.overrides.clone();
        effective.extend(overrides);
        graph.overrides = effective;

        tracing::debug!(
            "manifest declares {} dependencies and {} dev dependencies",
            manifest.dependencies.len(),
            manifest.dev_dependencies.len()
        );

        if let Some(ref group) = group {
            group.validate(manifest.groups.as_ref())?;
        }

        if include_dev.includes_production() {
            graph.add_dependencies(&manifest.dependencies, group.as_ref(), &manifest);
        }

        if include_dev.includes_development() {
            graph.add_dependencies(&manifest.dev_dependencies, group.as_ref(), &manifest);
        }

        if include_self {
            graph.add(
                manifest.self_name(),
                manifest.dir().to_path_buf(),
                manifest.main.clone(),
            );
        }

        tracing::debug!("registered {} packages", graph.packages.len());

        Ok(graph)
    }

    /// Registered entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &PackageEntry> {
        self.packages.values()
    }

    /// Look up an entry by name.
    pub fn entry(&self, name: &str) -> Option<&PackageEntry> {
        self.packages.get(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// The merged override map.
    pub fn overrides(&self) -> &IndexMap<String, PackageOverride> {
        &self.overrides
    }

    fn add_dependencies(
        &mut self,
        deps: &DependencyList,
        group: Option<&GroupSelector>,
        manifest: &Manifest,
    ) {
        if deps.is_empty() {
            return;
        }

        match deps {
            DependencyList::Map(deps) => {
                let selected = match group {
                    Some(group) => group.filter(deps, manifest.groups.as_ref()),
                    None => deps.clone(),
                };

                for name in selected.keys() {
                    let path = self.module_dir.join(name);
                    self.add(name, path, None);
                }
            }
            DependencyList::Single(name) => {
                self.add(name, manifest.dir().to_path_buf(), None);
            }
        }
    }

    /// Register `name` unless it is already known; the first registration wins.
    fn add(&mut self, name: &str, path: PathBuf, main: Option<MainField>) {
        if self.packages.contains_key(name) {
            return;
        }

        if self.debugging {
            tracing::info!("PackageCollection add {} {}", name, path.display());
        } else {
            tracing::trace!("add {} {}", name, path.display());
        }

        let entry = PackageEntry::new(
            name,
            path,
            &self.module_dir,
            main,
            self.overrides.get(name),
            self.env.as_deref(),
        );
        let deps = entry.dependencies().to_vec();
        let entry_dir = entry.path().to_path_buf();
        self.packages.insert(name.to_string(), entry);

        let mut missing = HashSet::new();
        for dep in deps {
            if self.packages.contains_key(&dep) {
                continue;
            }

            let path = self.dependency_path(&entry_dir, &dep);
            if path.is_dir() {
                self.add(&dep, path, None);
            } else {
                tracing::debug!("{} depends on {}, which is not installed", name, dep);
                missing.insert(dep);
            }
        }

        if !missing.is_empty() {
            if let Some(entry) = self.packages.get_mut(name) {
                entry.retain_dependencies(|dep| !missing.contains(dep));
            }
        }
    }

    /// Nested installs win over the shared module directory.
    fn dependency_path(&self, dependent: &Path, dep: &str) -> PathBuf {
        let nested = dependent.join(MODULE_DIR_NAME).join(dep);
        if nested.is_dir() {
            nested
        } else {
            self.module_dir.join(dep)
        }
    }

    /// Resolve every entry and concatenate their files.
    pub fn collect(&self) -> Result<Collected, CollectError> {
        let mut queue: Vec<usize> = (0..self.packages.len()).collect();
        let mut last_queue_length = 0;
        let mut processed = HashSet::new();
        let mut collected = Collected::default();

        while !queue.is_empty() {
            let force = queue.len() == last_queue_length;
            last_queue_length = queue.len();
            collected.passes += 1;

            if force {
                tracing::debug!(
                    "queue stalled at {} packages, forcing resolution",
                    last_queue_length
                );
            }

            for index in std::mem::take(&mut queue) {
                let Some((name, entry)) = self.packages.get_index(index) else {
                    continue;
                };

                match entry.files(force, &processed)? {
                    Resolution::NotResolvable => queue.push(index),
                    Resolution::Files(files) => {
                        tracing::trace!("{} contributed {} files", name, files.len());
                        collected.files.extend(files);
                        collected.order.push(name.clone());
                        processed.insert(name.clone());
                    }
                }
            }
        }

        Ok(collected)
    }
}
