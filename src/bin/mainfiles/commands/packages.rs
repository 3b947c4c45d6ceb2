//! `mainfiles packages` command

use anyhow::Result;

use crate::cli::PackagesArgs;
use crate::commands::collect_options;
use mainfiles::ops::build_graph;

pub fn execute(args: PackagesArgs) -> Result<()> {
    let opts = collect_options(args.collect)?;
    let graph = build_graph(&opts)?;

    for entry in graph.entries() {
        let main = match entry.main() {
            _ if entry.is_ignored() => "(ignored)".to_string(),
            Some(main) => main.patterns().join(", "),
            None => "index.js".to_string(),
        };

        println!("{} {} -> {}", entry.name(), entry.path().display(), main);

        if !entry.dependencies().is_empty() {
            println!("    after: {}", entry.dependencies().join(", "));
        }
    }

    Ok(())
}
