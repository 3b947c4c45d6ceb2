//! package.json manifest parsing and schema.
//!
//! The project manifest declares the dependencies to collect, per-package
//! overrides and named dependency groups. Comments are allowed and stripped
//! before parsing.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::core::package::PackageOverride;
use crate::resolver::errors::CollectError;
use crate::util::jsonc::strip_comments;

/// Name used for the project's own entry when the manifest has no `name`.
pub const SELF_NAME: &str = "self";

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "package.json";

/// Canonical module directory name.
pub const MODULE_DIR_NAME: &str = "node_modules";

/// A `main` declaration: one file reference or several.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MainField {
    One(String),
    Many(Vec<String>),
}

impl MainField {
    /// The file references in declaration order.
    pub fn patterns(&self) -> Vec<String> {
        match self {
            MainField::One(main) => vec![main.clone()],
            MainField::Many(mains) => mains.clone(),
        }
    }
}

impl From<&str> for MainField {
    fn from(main: &str) -> Self {
        MainField::One(main.to_string())
    }
}

/// Dependency declarations.
///
/// Normally a `name -> version` map. A bare string names a single entry that
/// lives in the project directory itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DependencyList {
    Map(IndexMap<String, String>),
    Single(String),
}

impl Default for DependencyList {
    fn default() -> Self {
        DependencyList::Map(IndexMap::new())
    }
}

impl DependencyList {
    /// Number of declared dependencies.
    pub fn len(&self) -> usize {
        match self {
            DependencyList::Map(deps) => deps.len(),
            DependencyList::Single(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raw manifest as deserialized from JSON.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    main: Option<MainField>,

    #[serde(default)]
    dependencies: Option<DependencyList>,

    #[serde(default)]
    dev_dependencies: Option<DependencyList>,

    #[serde(default)]
    overrides: Option<IndexMap<String, PackageOverride>>,

    #[serde(default)]
    group: Option<IndexMap<String, Vec<String>>>,
}

/// The parsed project manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Project name
    pub name: Option<String>,

    /// The project's own entry point
    pub main: Option<MainField>,

    /// Production dependencies
    pub dependencies: DependencyList,

    /// Development dependencies
    pub dev_dependencies: DependencyList,

    /// Per-package overrides declared in the manifest
    pub overrides: IndexMap<String, PackageOverride>,

    /// Named dependency groups; `None` when the manifest declares no `group` section
    pub groups: Option<IndexMap<String, Vec<String>>>,

    /// Path of the manifest file
    pub path: PathBuf,
}

impl Manifest {
    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self, CollectError> {
        if !path.exists() {
            return Err(CollectError::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = std::fs::read(path).map_err(|source| CollectError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&String::from_utf8_lossy(&bytes), path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self, CollectError> {
        let raw: RawManifest =
            serde_json::from_str(&strip_comments(content)).map_err(|source| {
                CollectError::ManifestParse {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        Ok(Manifest {
            name: raw.name,
            main: raw.main,
            dependencies: raw.dependencies.unwrap_or_default(),
            dev_dependencies: raw.dev_dependencies.unwrap_or_default(),
            overrides: raw.overrides.unwrap_or_default(),
            groups: raw.group,
            path: path.to_path_buf(),
        })
    }

    /// The directory containing this manifest.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    /// Name of the project's own entry.
    pub fn self_name(&self) -> &str {
        self.name.as_deref().unwrap_or(SELF_NAME)
    }
}

/// The subset of a dependency's own package.json that collection cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleManifest {
    pub main: Option<MainField>,
    pub dependencies: Vec<String>,
}

impl ModuleManifest {
    /// Read `<dir>/package.json`, if there is one.
    ///
    /// Third-party manifests are read leniently: unreadable or malformed
    /// documents and odd field shapes are treated as absent.
    pub fn load(dir: &Path) -> Option<Self> {
        let path = dir.join(MANIFEST_NAME);
        if !path.is_file() {
            return None;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("failed to read {}: {}", path.display(), e);
                return None;
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&strip_comments(&content)) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("ignoring malformed {}: {}", path.display(), e);
                return None;
            }
        };

        let main = value
            .get("main")
            .and_then(|main| serde_json::from_value::<MainField>(main.clone()).ok());

        let dependencies = value
            .get("dependencies")
            .and_then(|deps| deps.as_object())
            .map(|deps| deps.keys().cloned().collect())
            .unwrap_or_default();

        Some(ModuleManifest { main, dependencies })
    }
}
