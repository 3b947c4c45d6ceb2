//! Command implementations

pub mod completions;
pub mod list;
pub mod packages;

use anyhow::{Context, Result};
use mainfiles::util::config::{global_config_path, load_config, PROJECT_CONFIG_NAME};
use mainfiles::CollectOptions;

use crate::cli::CollectArgs;

/// Build collection options from config files and flags; flags win.
pub fn collect_options(args: CollectArgs) -> Result<CollectOptions> {
    let cwd = std::env::current_dir().context("failed to determine the working directory")?;
    let cwd = match args.root {
        Some(root) => cwd.join(root),
        None => cwd,
    };

    let config = load_config(
        global_config_path().as_deref(),
        &cwd.join(PROJECT_CONFIG_NAME),
    );
    let mut opts = config.into_options(&cwd);

    if args.package.is_some() {
        opts.paths.package = args.package;
    }
    if args.package_json.is_some() {
        opts.paths.package_json = args.package_json;
    }
    if args.package_directory.is_some() {
        opts.paths.package_directory = args.package_directory;
    }
    if let Some(include_dev) = args.include_dev {
        opts.include_dev = include_dev;
    }
    if args.include_self {
        opts.include_self = true;
    }
    if args.group.is_some() {
        opts.group = args.group;
    }
    if args.env.is_some() {
        opts.env = args.env;
    }
    if args.debugging {
        opts.debugging = true;
    }

    Ok(opts)
}
