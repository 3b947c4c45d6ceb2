//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use mainfiles::{GroupSelector, IncludeDev};

/// mainfiles - list the main files of a project's dependencies
#[derive(Parser)]
#[command(name = "mainfiles")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the collected main files
    List(ListArgs),

    /// Show the packages that take part in collection
    Packages(PackagesArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every collecting command.
#[derive(Args)]
pub struct CollectArgs {
    /// Directory to run in (defaults to the current directory)
    #[arg(short = 'C', long)]
    pub root: Option<PathBuf>,

    /// package.json whose directory is the project directory
    #[arg(long)]
    pub package: Option<PathBuf>,

    /// Explicit package.json location
    #[arg(long)]
    pub package_json: Option<PathBuf>,

    /// Explicit module directory (defaults to node_modules)
    #[arg(long)]
    pub package_directory: Option<PathBuf>,

    /// Include devDependencies; `exclusive` includes only them
    #[arg(long, value_name = "MODE", num_args = 0..=1, default_missing_value = "inclusive")]
    pub include_dev: Option<IncludeDev>,

    /// Add the project's own main file last
    #[arg(long)]
    pub include_self: bool,

    /// Group selector: `name`, `!name`, or a comma-separated list
    #[arg(short, long)]
    pub group: Option<GroupSelector>,

    /// Environment for environment-specific override mains
    #[arg(long, env = "NODE_ENV")]
    pub env: Option<String>,

    /// Log every package registration
    #[arg(long)]
    pub debugging: bool,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub collect: CollectArgs,

    /// Glob pattern the files must match (repeatable, `!` negates)
    #[arg(short, long)]
    pub filter: Vec<String>,

    /// Regular expression the files must match
    #[arg(long, conflicts_with = "filter")]
    pub regex: Option<String>,

    /// Print paths relative to the working directory
    #[arg(long)]
    pub relative: bool,

    /// Emit the file list as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PackagesArgs {
    #[command(flatten)]
    pub collect: CollectArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
