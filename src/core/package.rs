//! PackageEntry - one resolvable dependency and its main files.
//!
//! An entry knows its directory and how to find its main file(s). Finding
//! them may legitimately fail for now: a dependency that has not been
//! processed yet, or a main file that another build step has not produced
//! yet, makes the entry report [`Resolution::NotResolvable`] until the
//! collection forces it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::core::manifest::{MainField, ModuleManifest};
use crate::resolver::errors::CollectError;
use crate::util::fs::{glob_files, has_glob_meta, is_inside, resolve_module_file};

/// Per-package configuration supplied by the manifest or the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageOverride {
    /// Replacement main file(s), optionally keyed by environment
    #[serde(default)]
    pub main: Option<MainOverride>,

    /// Contribute no files at all
    #[serde(default)]
    pub ignore: bool,

    /// Replacement dependency list
    #[serde(default)]
    pub dependencies: Option<IndexMap<String, String>>,
}

impl PackageOverride {
    /// Override only the main file(s).
    pub fn with_main(main: impl Into<MainField>) -> Self {
        PackageOverride {
            main: Some(MainOverride::Files(main.into())),
            ..Default::default()
        }
    }

    /// Override that drops the package from the result.
    pub fn ignored() -> Self {
        PackageOverride {
            ignore: true,
            ..Default::default()
        }
    }
}

/// An override `main`: the files themselves, or files per environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MainOverride {
    Files(MainField),
    PerEnv(IndexMap<String, MainField>),
}

impl MainOverride {
    /// The main files that apply in `env`, if any.
    pub fn for_env(&self, env: Option<&str>) -> Option<MainField> {
        match self {
            MainOverride::Files(main) => Some(main.clone()),
            MainOverride::PerEnv(by_env) => env.and_then(|env| by_env.get(env)).cloned(),
        }
    }
}

/// Outcome of asking an entry for its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The entry's files, in main declaration order.
    Files(Vec<PathBuf>),
    /// Try again on a later pass.
    NotResolvable,
}

/// One resolvable dependency.
#[derive(Debug, Clone)]
pub struct PackageEntry {
    name: String,
    path: PathBuf,
    main: Option<MainField>,
    dependencies: Vec<String>,
    ignore: bool,
}

impl PackageEntry {
    /// Create an entry for `name` living at `path`.
    ///
    /// Main priority: override `main` for the active environment, then (for
    /// entries outside `module_dir` only) `declared_main` or the name itself,
    /// then the `main` of the entry's own package.json. Entries with none of
    /// these fall back to `index.js` in their directory.
    pub fn new(
        name: impl Into<String>,
        path: PathBuf,
        module_dir: &Path,
        declared_main: Option<MainField>,
        overrides: Option<&PackageOverride>,
        env: Option<&str>,
    ) -> Self {
        let name = name.into();
        let is_module = is_inside(&path, module_dir);
        let own = if is_module {
            ModuleManifest::load(&path).unwrap_or_default()
        } else {
            ModuleManifest::default()
        };

        let override_main = overrides
            .and_then(|o| o.main.as_ref())
            .and_then(|main| main.for_env(env));

        let main = override_main.or_else(|| {
            if is_module {
                own.main.clone()
            } else {
                Some(declared_main.unwrap_or_else(|| MainField::One(name.clone())))
            }
        });

        let dependencies = match overrides.and_then(|o| o.dependencies.as_ref()) {
            Some(deps) => deps.keys().cloned().collect(),
            None => own.dependencies,
        };

        PackageEntry {
            name,
            path,
            main,
            dependencies,
            ignore: overrides.map(|o| o.ignore).unwrap_or(false),
        }
    }

    /// The dependency name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The entry's directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The selected main file reference(s), if any.
    pub fn main(&self) -> Option<&MainField> {
        self.main.as_ref()
    }

    /// Names this entry waits for before contributing its own files.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Restrict the waited-for dependencies to those `keep` accepts.
    pub fn retain_dependencies(&mut self, keep: impl FnMut(&String) -> bool) {
        self.dependencies.retain(keep);
    }

    pub fn is_ignored(&self) -> bool {
        self.ignore
    }

    /// Compute the entry's files.
    ///
    /// Without `force`, an unprocessed dependency or a main file that does not
    /// exist yet yields [`Resolution::NotResolvable`]. With `force`,
    /// dependencies are no longer waited for and a missing main file is a
    /// [`CollectError::MainNotFound`].
    pub fn files(
        &self,
        force: bool,
        processed: &HashSet<String>,
    ) -> Result<Resolution, CollectError> {
        if self.ignore {
            return Ok(Resolution::Files(Vec::new()));
        }

        if !force {
            if let Some(waiting) = self.dependencies.iter().find(|d| !processed.contains(*d)) {
                tracing::trace!("{} waits for {}", self.name, waiting);
                return Ok(Resolution::NotResolvable);
            }
        }

        let patterns = match &self.main {
            Some(main) => main.patterns(),
            None => vec!["index.js".to_string()],
        };

        let mut files = Vec::new();
        let mut missing = Vec::new();

        for pattern in &patterns {
            let pattern = pattern.trim_start_matches("./");

            if has_glob_meta(pattern) {
                let matched =
                    glob_files(&self.path, pattern).map_err(|e| CollectError::InvalidPattern {
                        pattern: pattern.to_string(),
                        message: e.to_string(),
                    })?;

                if matched.is_empty() {
                    missing.push(pattern.to_string());
                }
                files.extend(matched);
            } else {
                match resolve_module_file(&self.path.join(pattern)) {
                    Some(file) => files.push(file),
                    None => missing.push(pattern.to_string()),
                }
            }
        }

        if missing.is_empty() {
            return Ok(Resolution::Files(files));
        }

        if !force {
            tracing::trace!("{} is missing {}", self.name, missing.join(", "));
            return Ok(Resolution::NotResolvable);
        }

        Err(CollectError::MainNotFound {
            package: self.name.clone(),
            path: self.path.clone(),
            tried: missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Layout {
        _tmp: TempDir,
        root: PathBuf,
        modules: PathBuf,
    }

    fn layout() -> Layout {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();
        let modules = root.join("node_modules");
        fs::create_dir_all(&modules).unwrap();
        Layout {
            _tmp: tmp,
            root,
            modules,
        }
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_module_falls_back_to_index() {
        let l = layout();
        touch(&l.modules.join("a/index.js"));

        let entry = PackageEntry::new("a", l.modules.join("a"), &l.modules, None, None, None);
        let resolution = entry.files(false, &HashSet::new()).unwrap();
        assert_eq!(
            resolution,
            Resolution::Files(vec![l.modules.join("a/index.js")])
        );
    }

    #[test]
    fn test_module_uses_own_manifest_main() {
        let l = layout();
        touch(&l.modules.join("a/dist/a.js"));
        fs::write(
            l.modules.join("a/package.json"),
            r#"{ "main": "./dist/a" }"#,
        )
        .unwrap();

        let entry = PackageEntry::new("a", l.modules.join("a"), &l.modules, None, None, None);
        assert_eq!(
            entry.files(false, &HashSet::new()).unwrap(),
            Resolution::Files(vec![l.modules.join("a/dist/a.js")])
        );
    }

    #[test]
    fn test_declared_main_ignored_inside_module_dir() {
        let l = layout();
        touch(&l.modules.join("a/index.js"));

        let entry = PackageEntry::new(
            "a",
            l.modules.join("a"),
            &l.modules,
            Some(MainField::from("other.js")),
            None,
            None,
        );
        assert_eq!(entry.main(), None);
    }

    #[test]
    fn test_self_entry_uses_declared_main_or_name() {
        let l = layout();
        touch(&l.root.join("src/entry.js"));

        let entry = PackageEntry::new(
            "proj",
            l.root.clone(),
            &l.modules,
            Some(MainField::from("src/entry.js")),
            None,
            None,
        );
        assert_eq!(
            entry.files(false, &HashSet::new()).unwrap(),
            Resolution::Files(vec![l.root.join("src/entry.js")])
        );

        let unnamed = PackageEntry::new("proj", l.root.clone(), &l.modules, None, None, None);
        assert_eq!(unnamed.main(), Some(&MainField::from("proj")));
    }

    #[test]
    fn test_override_main_wins() {
        let l = layout();
        touch(&l.modules.join("a/index.js"));
        touch(&l.modules.join("a/dist/a.min.js"));
        touch(&l.modules.join("a/dist/a.css"));

        let overrides = PackageOverride::with_main(MainField::Many(vec![
            "dist/*.js".to_string(),
            "dist/a.css".to_string(),
        ]));
        let entry = PackageEntry::new(
            "a",
            l.modules.join("a"),
            &l.modules,
            None,
            Some(&overrides),
            None,
        );

        assert_eq!(
            entry.files(false, &HashSet::new()).unwrap(),
            Resolution::Files(vec![
                l.modules.join("a/dist/a.min.js"),
                l.modules.join("a/dist/a.css"),
            ])
        );
    }

    #[test]
    fn test_override_main_per_env() {
        let l = layout();
        touch(&l.modules.join("a/a.js"));
        touch(&l.modules.join("a/a.min.js"));

        let overrides: PackageOverride = serde_json::from_str(
            r#"{ "main": { "development": "a.js", "production": "a.min.js" } }"#,
        )
        .unwrap();

        let prod = PackageEntry::new(
            "a",
            l.modules.join("a"),
            &l.modules,
            None,
            Some(&overrides),
            Some("production"),
        );
        assert_eq!(prod.main(), Some(&MainField::from("a.min.js")));

        let unknown = PackageEntry::new(
            "a",
            l.modules.join("a"),
            &l.modules,
            None,
            Some(&overrides),
            Some("staging"),
        );
        assert_eq!(unknown.main(), None);
    }

    #[test]
    fn test_missing_main_is_not_resolvable_until_forced() {
        let l = layout();
        fs::create_dir_all(l.modules.join("gen")).unwrap();
        let overrides = PackageOverride::with_main("build/gen.js");
        let entry = PackageEntry::new(
            "gen",
            l.modules.join("gen"),
            &l.modules,
            None,
            Some(&overrides),
            None,
        );

        assert_eq!(
            entry.files(false, &HashSet::new()).unwrap(),
            Resolution::NotResolvable
        );

        let err = entry.files(true, &HashSet::new()).unwrap_err();
        match err {
            CollectError::MainNotFound { package, tried, .. } => {
                assert_eq!(package, "gen");
                assert_eq!(tried, vec!["build/gen.js".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        touch(&l.modules.join("gen/build/gen.js"));
        assert_eq!(
            entry.files(false, &HashSet::new()).unwrap(),
            Resolution::Files(vec![l.modules.join("gen/build/gen.js")])
        );
    }

    #[test]
    fn test_waits_for_dependencies() {
        let l = layout();
        touch(&l.modules.join("b/index.js"));
        fs::write(
            l.modules.join("b/package.json"),
            r#"{ "dependencies": { "a": "1.0.0" } }"#,
        )
        .unwrap();

        let entry = PackageEntry::new("b", l.modules.join("b"), &l.modules, None, None, None);
        assert_eq!(entry.dependencies(), &["a".to_string()]);

        let mut processed = HashSet::new();
        assert_eq!(
            entry.files(false, &processed).unwrap(),
            Resolution::NotResolvable
        );
        assert!(matches!(
            entry.files(true, &processed).unwrap(),
            Resolution::Files(_)
        ));

        processed.insert("a".to_string());
        assert!(matches!(
            entry.files(false, &processed).unwrap(),
            Resolution::Files(_)
        ));
    }

    #[test]
    fn test_ignored_entry_contributes_nothing() {
        let l = layout();
        let overrides = PackageOverride::ignored();
        let entry = PackageEntry::new(
            "types",
            l.modules.join("types"),
            &l.modules,
            None,
            Some(&overrides),
            None,
        );

        assert!(entry.is_ignored());
        assert_eq!(
            entry.files(true, &HashSet::new()).unwrap(),
            Resolution::Files(Vec::new())
        );
    }
}
