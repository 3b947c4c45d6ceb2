//! Collecting the main files of a project's dependencies.
//!
//! This is the entry point most callers want: it resolves the manifest and
//! module directory locations, checks both exist, builds the
//! [`DependencyGraph`] and filters its result.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::core::group::GroupSelector;
use crate::core::manifest::{MANIFEST_NAME, MODULE_DIR_NAME};
use crate::core::package::PackageOverride;
use crate::ops::filter::FileFilter;
use crate::resolver::errors::CollectError;
use crate::resolver::graph::{DependencyGraph, GraphConfig, IncludeDev};

/// Where to find the manifest and module directory.
#[derive(Debug, Clone, Default)]
pub struct CollectPaths {
    /// Rebase the working directory before anything else is resolved.
    pub root: Option<PathBuf>,
    /// A package.json whose directory becomes the project directory.
    pub package: Option<PathBuf>,
    /// Explicit manifest, relative to the original working directory.
    pub package_json: Option<PathBuf>,
    /// Explicit module directory, relative to the original working directory.
    pub package_directory: Option<PathBuf>,
}

/// Resolved manifest and module directory locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub package_json: PathBuf,
    pub package_directory: PathBuf,
}

impl CollectPaths {
    /// Resolve against `cwd`.
    pub fn resolve(&self, cwd: &Path) -> ResolvedPaths {
        let mut project_dir = match &self.root {
            Some(root) => cwd.join(root),
            None => cwd.to_path_buf(),
        };

        let package = project_dir.join(
            self.package
                .as_deref()
                .unwrap_or_else(|| Path::new(MANIFEST_NAME)),
        );
        if package.exists() {
            if let Some(parent) = package.parent() {
                project_dir = parent.to_path_buf();
            }
        }

        let package_json = match &self.package_json {
            Some(path) => cwd.join(path),
            None => project_dir.join(MANIFEST_NAME),
        };

        let package_directory = match &self.package_directory {
            Some(path) => cwd.join(path),
            None => project_dir.join(MODULE_DIR_NAME),
        };

        ResolvedPaths {
            package_json,
            package_directory,
        }
    }
}

/// Options for [`collect_files`].
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    pub paths: CollectPaths,
    pub filter: Option<FileFilter>,
    pub include_dev: IncludeDev,
    pub include_self: bool,
    pub overrides: IndexMap<String, PackageOverride>,
    pub group: Option<GroupSelector>,
    pub debugging: bool,
    /// Environment for environment-keyed override mains
    pub env: Option<String>,
    /// Directory relative paths are resolved against
    pub cwd: PathBuf,
}

impl CollectOptions {
    /// Options rooted at `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        CollectOptions {
            cwd: cwd.into(),
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<FileFilter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_include_dev(mut self, include_dev: IncludeDev) -> Self {
        self.include_dev = include_dev;
        self
    }

    pub fn with_include_self(mut self, include_self: bool) -> Self {
        self.include_self = include_self;
        self
    }

    pub fn with_group(mut self, group: impl Into<GroupSelector>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_override(mut self, name: impl Into<String>, overrides: PackageOverride) -> Self {
        self.overrides.insert(name.into(), overrides);
        self
    }

    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    pub fn with_paths(mut self, paths: CollectPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_debugging(mut self, debugging: bool) -> Self {
        self.debugging = debugging;
        self
    }
}

/// Check that the manifest and module directory exist and build the graph.
pub fn build_graph(opts: &CollectOptions) -> Result<DependencyGraph, CollectError> {
    let paths = opts.paths.resolve(&opts.cwd);

    if !paths.package_json.exists() {
        return Err(CollectError::ManifestNotFound {
            path: paths.package_json,
        });
    }

    if !paths.package_directory.exists() {
        return Err(CollectError::ModuleDirectoryNotFound {
            path: paths.package_directory,
        });
    }

    tracing::debug!(
        "collecting from {} with modules in {}",
        paths.package_json.display(),
        paths.package_directory.display()
    );

    DependencyGraph::new(GraphConfig {
        manifest_path: paths.package_json,
        module_dir: paths.package_directory,
        include_dev: opts.include_dev,
        include_self: opts.include_self,
        overrides: opts.overrides.clone(),
        group: opts.group.clone(),
        env: opts.env.clone(),
        debugging: opts.debugging,
    })
}

/// Collect the filtered main files of every selected dependency.
pub fn collect_files(opts: &CollectOptions) -> Result<Vec<PathBuf>, CollectError> {
    let graph = build_graph(opts)?;
    let collected = graph.collect()?;

    tracing::debug!(
        "collected {} files from {} packages in {} passes",
        collected.files.len(),
        collected.order.len(),
        collected.passes
    );

    match &opts.filter {
        Some(filter) => filter.apply(collected.files),
        None => Ok(collected.files),
    }
}

/// Callback form of [`collect_files`].
///
/// The callback receives the error (if any) and the files, which are empty on
/// every failure path. The same files are returned.
pub fn collect_files_then<F>(opts: &CollectOptions, callback: F) -> Vec<PathBuf>
where
    F: FnOnce(Option<CollectError>, Vec<PathBuf>),
{
    match collect_files(opts) {
        Ok(files) => {
            callback(None, files.clone());
            files
        }
        Err(e) => {
            callback(Some(e), Vec::new());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ProjectFixture;

    #[test]
    fn test_resolve_default_paths() {
        let fixture = ProjectFixture::new("{}");
        let paths = CollectPaths::default().resolve(fixture.root());

        assert_eq!(paths.package_json, fixture.manifest_path());
        assert_eq!(paths.package_directory, fixture.module_dir());
    }

    #[test]
    fn test_resolve_package_moves_project_dir() {
        let fixture = ProjectFixture::new("{}").with_file("web/package.json");
        let paths = CollectPaths {
            package: Some(PathBuf::from("web/package.json")),
            ..Default::default()
        }
        .resolve(fixture.root());

        assert_eq!(paths.package_json, fixture.root().join("web/package.json"));
        assert_eq!(
            paths.package_directory,
            fixture.root().join("web").join(MODULE_DIR_NAME)
        );
    }

    #[test]
    fn test_resolve_explicit_paths_use_original_cwd() {
        let fixture = ProjectFixture::new("{}");
        let paths = CollectPaths {
            root: Some(PathBuf::from("sub")),
            package_json: Some(PathBuf::from("package.json")),
            package_directory: Some(PathBuf::from("vendor")),
            ..Default::default()
        }
        .resolve(fixture.root());

        assert_eq!(paths.package_json, fixture.manifest_path());
        assert_eq!(paths.package_directory, fixture.root().join("vendor"));
    }

    #[test]
    fn test_collect_single_dependency() {
        let fixture = ProjectFixture::new(r#"{ "dependencies": { "a": "1.0.0" } }"#)
            .with_module_file("a", "index.js");

        let files = collect_files(&CollectOptions::new(fixture.root())).unwrap();
        assert_eq!(files, vec![fixture.module_dir().join("a/index.js")]);
    }

    #[test]
    fn test_collect_with_filter() {
        let fixture = ProjectFixture::new(r#"{ "dependencies": { "a": "1", "b": "1" } }"#)
            .with_module_manifest("a", r#"{ "main": ["a.js", "a.css"] }"#)
            .with_module_file("a", "a.js")
            .with_module_file("a", "a.css")
            .with_module_file("b", "index.js");

        let opts = CollectOptions::new(fixture.root()).with_filter("*.css");
        let files = collect_files(&opts).unwrap();
        assert_eq!(files, vec![fixture.module_dir().join("a/a.css")]);
    }

    #[test]
    fn test_missing_manifest_is_an_error() {
        let fixture = ProjectFixture::new("{}");
        std::fs::remove_file(fixture.manifest_path()).unwrap();

        let mut seen = None;
        let files = collect_files_then(&CollectOptions::new(fixture.root()), |err, files| {
            seen = Some((err, files));
        });

        assert!(files.is_empty());
        let (err, cb_files) = seen.unwrap();
        assert!(matches!(err, Some(CollectError::ManifestNotFound { .. })));
        assert!(cb_files.is_empty());
    }

    #[test]
    fn test_missing_module_directory_is_an_error() {
        let fixture = ProjectFixture::without_modules(r#"{ "dependencies": { "a": "1" } }"#);
        let err = collect_files(&CollectOptions::new(fixture.root())).unwrap_err();
        assert!(matches!(err, CollectError::ModuleDirectoryNotFound { .. }));
    }

    #[test]
    fn test_unparsable_manifest_is_empty_without_error() {
        let fixture = ProjectFixture::new("{ \"dependencies\": ");

        let mut seen = None;
        let files = collect_files_then(&CollectOptions::new(fixture.root()), |err, files| {
            seen = Some((err, files));
        });

        assert!(files.is_empty());
        let (err, cb_files) = seen.unwrap();
        assert!(err.is_none());
        assert!(cb_files.is_empty());
    }

    #[test]
    fn test_undecodable_manifest_is_empty_without_error() {
        let fixture = ProjectFixture::new("{}");
        std::fs::write(fixture.manifest_path(), b"\xff\xfe").unwrap();

        let mut seen = None;
        let files = collect_files_then(&CollectOptions::new(fixture.root()), |err, files| {
            seen = Some((err, files));
        });

        assert!(files.is_empty());
        let (err, cb_files) = seen.unwrap();
        assert!(err.is_none());
        assert!(cb_files.is_empty());
    }

    #[test]
    fn test_include_self_and_env_override() {
        let fixture = ProjectFixture::new(
            r#"{ "name": "proj", "main": "src/entry.js", "dependencies": { "a": "1" } }"#,
        )
        .with_module_file("a", "a.js")
        .with_module_file("a", "a.min.js")
        .with_file("src/entry.js");

        let overrides: PackageOverride = serde_json::from_str(
            r#"{ "main": { "development": "a.js", "production": "a.min.js" } }"#,
        )
        .unwrap();

        let opts = CollectOptions::new(fixture.root())
            .with_include_self(true)
            .with_override("a", overrides)
            .with_env("production");

        let files = collect_files(&opts).unwrap();
        assert_eq!(
            files,
            vec![
                fixture.module_dir().join("a/a.min.js"),
                fixture.root().join("src/entry.js"),
            ]
        );
    }
}
