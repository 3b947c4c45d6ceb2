//! On-disk project fixtures.
//!
//! A [`ProjectFixture`] is a temporary project directory with a package.json
//! and a `node_modules` directory that tests populate builder-style.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::manifest::{MANIFEST_NAME, MODULE_DIR_NAME};

/// A temporary project with a manifest and a module directory.
#[derive(Debug)]
pub struct ProjectFixture {
    tmp: TempDir,
}

impl ProjectFixture {
    /// Create a project whose package.json holds `manifest` verbatim.
    pub fn new(manifest: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MANIFEST_NAME), manifest).unwrap();
        fs::create_dir_all(tmp.path().join(MODULE_DIR_NAME)).unwrap();
        ProjectFixture { tmp }
    }

    /// Create a project without a module directory.
    pub fn without_modules(manifest: &str) -> Self {
        let fixture = Self::new(manifest);
        fs::remove_dir_all(fixture.module_dir()).unwrap();
        fixture
    }

    /// Project root directory.
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root().join(MANIFEST_NAME)
    }

    pub fn module_dir(&self) -> PathBuf {
        self.root().join(MODULE_DIR_NAME)
    }

    /// Add an empty file relative to the project root.
    pub fn with_file(self, relative: &str) -> Self {
        touch(&self.root().join(relative));
        self
    }

    /// Add an empty installed module directory.
    pub fn with_module_dir(self, module: &str) -> Self {
        fs::create_dir_all(self.module_dir().join(module)).unwrap();
        self
    }

    /// Add an empty file inside an installed module.
    pub fn with_module_file(self, module: &str, relative: &str) -> Self {
        touch(&self.module_dir().join(module).join(relative));
        self
    }

    /// Give an installed module its own package.json.
    pub fn with_module_manifest(self, module: &str, manifest: &str) -> Self {
        let dir = self.module_dir().join(module);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_NAME), manifest).unwrap();
        self
    }
}

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "").unwrap();
}
