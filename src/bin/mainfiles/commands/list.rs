//! `mainfiles list` command

use anyhow::{Context, Result};
use regex::Regex;

use crate::cli::ListArgs;
use crate::commands::collect_options;
use mainfiles::util::diagnostic::{emit, Diagnostic};
use mainfiles::util::fs::relative_path;
use mainfiles::{collect_files, FileFilter};

pub fn execute(args: ListArgs, color: bool) -> Result<()> {
    let mut opts = collect_options(args.collect)?;

    if let Some(ref pattern) = args.regex {
        let re = Regex::new(pattern).with_context(|| format!("invalid regex: {}", pattern))?;
        opts = opts.with_filter(re);
    } else if !args.filter.is_empty() {
        opts = opts.with_filter(FileFilter::Globs(args.filter));
    }

    let filter = opts.filter.take();
    let collected = collect_files(&opts)?;
    let total = collected.len();

    let files = match filter {
        Some(filter) => filter.apply(collected)?,
        None => collected,
    };
    tracing::debug!("{} of {} files", files.len(), total);

    if files.is_empty() && total > 0 {
        let warning = Diagnostic::warning(format!(
            "the filter matched none of the {} collected files",
            total
        ))
        .with_suggestion("Check the --filter patterns or the `filter` key in mainfiles.toml");
        emit(&warning, color);
    }

    let lines: Vec<String> = files
        .iter()
        .map(|file| {
            if args.relative {
                relative_path(&opts.cwd, file).display().to_string()
            } else {
                file.display().to_string()
            }
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
    } else {
        for line in lines {
            println!("{}", line);
        }
    }

    Ok(())
}
