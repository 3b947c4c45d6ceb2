//! mainfiles CLI - list the main files of a project's dependencies

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use mainfiles::util::diagnostic::emit;
use mainfiles::CollectError;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        match e.downcast_ref::<CollectError>() {
            Some(collect_error) => emit(&collect_error.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("mainfiles=debug")
    } else {
        EnvFilter::new("mainfiles=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::List(args) => commands::list::execute(args, color),
        Commands::Packages(args) => commands::packages::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
