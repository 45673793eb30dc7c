//! `gvfs apply`: run the projection over an index listing.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Args;
use gvfs_config::log_cli_warn;
use gvfs_filter::MemoryIndex;

use crate::Context;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Print entries and counters as JSON
    #[arg(long)]
    json: bool,

    /// File listing index paths, NUL- or newline-separated (`-` for stdin)
    #[arg(value_name = "INDEX_FILE")]
    index: PathBuf,
}

fn read_index(path: &Path) -> Result<MemoryIndex> {
    if path.as_os_str() == "-" {
        return MemoryIndex::read_from(io::stdin().lock()).context("Failed to read index from stdin");
    }
    let file = File::open(path)
        .with_context(|| format!("Failed to open index file {}", path.display()))?;
    MemoryIndex::read_from(BufReader::new(file))
        .with_context(|| format!("Failed to read index file {}", path.display()))
}

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<ExitCode> {
    let mut index = read_index(&args.index)?;
    let filter = ctx.filter();
    if !filter.enabled() {
        log_cli_warn!("core.virtualfilesystem is not set; index left unchanged");
    }

    let stats = filter.apply(&mut index)?;

    if args.json {
        let entries: Vec<_> = index
            .entries()
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "name": String::from_utf8_lossy(&entry.name),
                    "skip_worktree": entry.skip_worktree(),
                })
            })
            .collect();
        let report = serde_json::json!({ "entries": entries, "stats": stats });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for entry in index.entries() {
            let tag = if entry.skip_worktree() { 'S' } else { 'H' };
            println!("{} {}", tag, String::from_utf8_lossy(&entry.name));
        }
        let skipped = index.entries().iter().filter(|e| e.skip_worktree()).count();
        eprintln!(
            "{} tracked, {} skipped, {} patterns ({} directories, {} unknown)",
            stats.tracked(),
            skipped,
            stats.nr_vfs_rows,
            stats.nr_vfs_dirs,
            stats.nr_unknown
        );
    }
    Ok(ExitCode::SUCCESS)
}
