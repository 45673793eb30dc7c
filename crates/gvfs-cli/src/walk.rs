//! `gvfs walk`: list the work tree the way a projected status walk sees it.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use gvfs_config::path::to_repo_relative;
use gvfs_config::{log_cli_debug, CONFIG_DIR};
use gvfs_filter::{DirentType, Exclusion, VirtualFilesystem};
use walkdir::{DirEntry, WalkDir};

use crate::Context;

/// Directories the walk never descends into
const SKIP_DIRS: &[&str] = &[".git", CONFIG_DIR];

#[derive(Args, Debug)]
pub struct WalkArgs {
    /// Directory to walk (default: the work tree)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct WalkCounts {
    kept: u64,
    excluded: u64,
}

fn is_excluded(filter: &VirtualFilesystem, root: &Path, entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let dtype = DirentType::from_file_type(entry.file_type());
    if matches!(dtype, DirentType::Other(_)) {
        return true;
    }
    match to_repo_relative(entry.path(), root) {
        Ok(rel) => filter.is_excluded(&rel, dtype) == Exclusion::Excluded,
        Err(_) => false,
    }
}

pub fn run(ctx: &Context, args: WalkArgs) -> Result<ExitCode> {
    let filter = ctx.filter();
    filter.load()?;

    let root = ctx.work_tree.clone();
    let start = args
        .dir
        .map(|dir| if dir.is_absolute() { dir } else { root.join(dir) })
        .unwrap_or_else(|| root.clone());

    let mut counts = WalkCounts::default();
    let walker = WalkDir::new(&start)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_dir() && SKIP_DIRS.contains(&name.as_ref()) {
                return false;
            }
            if is_excluded(&filter, &root, entry) {
                counts.excluded += 1;
                return false;
            }
            true
        });

    let mut kept = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }
        let Ok(rel) = to_repo_relative(entry.path(), &root) else {
            continue;
        };
        let mut line = String::from_utf8_lossy(&rel).into_owned();
        if entry.file_type().is_dir() {
            line.push('/');
        }
        kept.push(line);
    }
    counts.kept = kept.len() as u64;

    for line in &kept {
        println!("{}", line);
    }
    log_cli_debug!(
        "Walk finished",
        kept = counts.kept,
        excluded = counts.excluded
    );
    eprintln!("{} kept, {} excluded", counts.kept, counts.excluded);
    Ok(ExitCode::SUCCESS)
}
