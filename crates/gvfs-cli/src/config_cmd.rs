//! `gvfs config`: inspect the merged configuration.

use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Subcommand;
use gvfs_config::Config;

use crate::Context;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,

    /// Print the configuration file locations
    Path,

    /// Print one dotted key, e.g. `core.virtualfilesystem`
    Get {
        /// Key to look up
        key: String,
    },
}

pub fn run(ctx: &Context, command: ConfigCommands) -> Result<ExitCode> {
    match command {
        ConfigCommands::Show => {
            let rendered =
                toml::to_string_pretty(&ctx.config).context("Failed to render configuration")?;
            print!("{}", rendered);
        }
        ConfigCommands::Path => {
            match Config::global_config_path() {
                Some(path) => println!("Global:  {}", path.display()),
                None => println!("Global:  (no config directory)"),
            }
            println!(
                "Project: {}",
                Config::project_config_path(&ctx.work_tree).display()
            );
        }
        ConfigCommands::Get { key } => match ctx.config.get(&key) {
            Some(value) => println!("{}", value),
            None => return Ok(ExitCode::FAILURE),
        },
    }
    Ok(ExitCode::SUCCESS)
}
