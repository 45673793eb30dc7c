//! `gvfs check`: query the filter for individual paths.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, ValueEnum};
use gvfs_config::path::to_repo_relative;
use gvfs_filter::DirentType;

use crate::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntryType {
    Reg,
    Lnk,
    Dir,
}

impl From<EntryType> for DirentType {
    fn from(value: EntryType) -> Self {
        match value {
            EntryType::Reg => DirentType::Regular,
            EntryType::Lnk => DirentType::Symlink,
            EntryType::Dir => DirentType::Directory,
        }
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Entry type used for the exclusion answer
    #[arg(long = "type", value_enum, default_value = "reg")]
    entry_type: EntryType,

    /// Repository-relative paths (absolute paths are made relative to the work tree)
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<String>,
}

fn relative_bytes(ctx: &Context, path: &str) -> Result<Vec<u8>> {
    if Path::new(path).is_absolute() {
        to_repo_relative(path, &ctx.work_tree)
    } else {
        Ok(path.trim_end_matches('/').as_bytes().to_vec())
    }
}

pub fn run(ctx: &Context, args: CheckArgs) -> Result<ExitCode> {
    let filter = ctx.filter();
    if filter.load()?.is_none() {
        eprintln!("warning: core.virtualfilesystem is not set; every answer is undecided");
    }

    let dtype = DirentType::from(args.entry_type);
    for path in &args.paths {
        let rel = relative_bytes(ctx, path)?;
        let included = filter.is_included(&rel);
        let excluded = filter.is_excluded(&rel, dtype);
        println!(
            "included={} excluded={} {}",
            included.code(),
            excluded.code(),
            path
        );
    }
    Ok(ExitCode::SUCCESS)
}
