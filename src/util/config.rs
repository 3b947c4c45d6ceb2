//! Configuration file support for mainfiles.
//!
//! Two configuration file locations are read:
//! - Global: `<config dir>/mainfiles/config.toml` - User-wide defaults
//! - Project: `mainfiles.toml` next to package.json - Project-specific settings
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::core::group::GroupSelector;
use crate::core::package::PackageOverride;
use crate::ops::collect::{CollectOptions, CollectPaths};
use crate::resolver::graph::IncludeDev;

/// Project configuration file name.
pub const PROJECT_CONFIG_NAME: &str = "mainfiles.toml";

/// mainfiles configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which dependency sections to include (false, true, "inclusive", "exclusive")
    pub include_dev: Option<IncludeDev>,

    /// Add the project's own main file
    pub include_self: Option<bool>,

    /// Group selector ("name", "!name" or a list)
    pub group: Option<GroupSelector>,

    /// Glob patterns applied to the collected files
    pub filter: Vec<String>,

    /// Environment for environment-keyed override mains
    pub env: Option<String>,

    /// Log every package registration
    pub debugging: bool,

    /// Path settings
    pub paths: PathsConfig,

    /// Per-package overrides
    pub overrides: IndexMap<String, PackageOverride>,
}

/// Path settings, relative to the working directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub package: Option<PathBuf>,
    pub package_json: Option<PathBuf>,
    pub package_directory: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.include_dev.is_some() {
            self.include_dev = other.include_dev;
        }
        if other.include_self.is_some() {
            self.include_self = other.include_self;
        }
        if other.group.is_some() {
            self.group = other.group;
        }
        if !other.filter.is_empty() {
            self.filter = other.filter;
        }
        if other.env.is_some() {
            self.env = other.env;
        }
        if other.debugging {
            self.debugging = true;
        }

        if other.paths.package.is_some() {
            self.paths.package = other.paths.package;
        }
        if other.paths.package_json.is_some() {
            self.paths.package_json = other.paths.package_json;
        }
        if other.paths.package_directory.is_some() {
            self.paths.package_directory = other.paths.package_directory;
        }

        self.overrides.extend(other.overrides);
    }

    /// Turn the configuration into collection options rooted at `cwd`.
    pub fn into_options(self, cwd: &Path) -> CollectOptions {
        let mut opts = CollectOptions::new(cwd).with_paths(CollectPaths {
            root: None,
            package: self.paths.package,
            package_json: self.paths.package_json,
            package_directory: self.paths.package_directory,
        });

        opts.include_dev = self.include_dev.unwrap_or_default();
        opts.include_self = self.include_self.unwrap_or(false);
        opts.group = self.group;
        opts.env = self.env;
        opts.debugging = self.debugging;
        opts.overrides = self.overrides;

        if !self.filter.is_empty() {
            opts = opts.with_filter(self.filter);
        }

        opts
    }
}

/// Location of the global configuration file, if the platform has one.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mainfiles").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (mainfiles.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
