//! # gvfs CLI
//!
//! Command-line interface for the gvfs projection filter.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gvfs_config::logging::{init_logging, LogLevel};
use gvfs_config::{log_cli_debug, Config};
use gvfs_filter::{VfsError, VfsSettings, VirtualFilesystem};

mod apply;
mod check;
mod config_cmd;
mod var;
mod walk;

/// Exit code for fatal errors
const EXIT_FATAL: u8 = 128;
/// Exit code for usage errors
const EXIT_USAGE: u8 = 129;

/// gvfs - partial working trees backed by a projection hook
#[derive(Parser)]
#[command(name = "gvfs")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Work-tree root (default: discovered from the current directory)
    #[arg(long, global = true, env = "GVFS_WORK_TREE")]
    work_tree: Option<PathBuf>,

    /// Match paths ignoring ASCII case (overrides core.ignorecase)
    #[arg(long, global = true)]
    ignore_case: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a logical variable, or list all with -l
    Var(var::VarArgs),

    /// Ask the filter about paths
    Check(check::CheckArgs),

    /// Apply the projection to an index file and report skip-worktree bits
    Apply(apply::ApplyArgs),

    /// Walk the work tree, skipping what the projection excludes
    Walk(walk::WalkArgs),

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: config_cmd::ConfigCommands,
    },
}

/// Shared state handed to every subcommand
pub struct Context {
    pub config: Config,
    pub work_tree: PathBuf,
}

impl Context {
    fn load(cli: &Cli) -> Result<Self> {
        let start = match &cli.work_tree {
            Some(tree) => tree.clone(),
            None => {
                let cwd = std::env::current_dir()?;
                gvfs_config::path::discover_work_tree(&cwd).unwrap_or(cwd)
            }
        };

        let mut config = Config::load_for(&start)?;
        if let Some(tree) = &cli.work_tree {
            config.core.worktree = Some(tree.clone());
        }
        if cli.ignore_case {
            config.core.ignorecase = true;
        }

        let work_tree = config.work_tree();
        Ok(Self { config, work_tree })
    }

    /// Filter configured from this context
    pub fn filter(&self) -> VirtualFilesystem {
        VirtualFilesystem::new(VfsSettings::from_config(&self.config))
    }
}

fn main() -> ExitCode {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    let cli = Cli::parse();

    init_logging(match cli.verbose {
        0 => LogLevel::Warn,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    });

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            if let Some(vfs_err) = err.downcast_ref::<VfsError>() {
                eprintln!("fatal: {}", vfs_err);
                ExitCode::from(EXIT_FATAL)
            } else {
                eprintln!("error: {:#}", err);
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let ctx = Context::load(&cli)?;
    log_cli_debug!(
        "Loaded configuration",
        work_tree = ctx.work_tree.display().to_string(),
        enabled = ctx.config.virtual_filesystem().is_some()
    );

    match cli.command {
        Commands::Var(args) => var::run(&ctx, args),
        Commands::Check(args) => check::run(&ctx, args),
        Commands::Apply(args) => apply::run(&ctx, args),
        Commands::Walk(args) => walk::run(&ctx, args),
        Commands::Config { command } => config_cmd::run(&ctx, command),
    }
}
