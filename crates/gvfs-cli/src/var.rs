//! `gvfs var`: look up logical variables.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use gvfs_filter::{HOOK_INTERFACE_VERSION, SHELL_PATH};

use crate::{Context, EXIT_USAGE};

const VAR_USAGE: &str = "usage: gvfs var (-l | <variable>)";

#[derive(Args, Debug)]
pub struct VarArgs {
    /// List configuration entries and all variables
    #[arg(short = 'l', conflicts_with = "name")]
    list: bool,

    /// Variable to show
    #[arg(value_name = "VARIABLE")]
    name: Option<String>,
}

struct Var {
    name: &'static str,
    read: fn(&Context) -> Option<String>,
}

const VARS: &[Var] = &[
    Var {
        name: "GVFS_VIRTUALFILESYSTEM",
        read: |ctx| ctx.config.virtual_filesystem().map(str::to_string),
    },
    Var {
        name: "GVFS_WORK_TREE",
        read: |ctx| Some(ctx.work_tree.display().to_string()),
    },
    Var {
        name: "GVFS_HOOK_VERSION",
        read: |_| Some(HOOK_INTERFACE_VERSION.to_string()),
    },
    Var {
        name: "GVFS_SHELL_PATH",
        read: |_| Some(SHELL_PATH.to_string()),
    },
    Var {
        name: "GVFS_IGNORECASE",
        read: |ctx| Some(ctx.config.core.ignorecase.to_string()),
    },
];

fn lookup(name: &str) -> Option<&'static Var> {
    VARS.iter().find(|var| var.name == name)
}

fn list(ctx: &Context) {
    for (key, value) in ctx.config.entries() {
        println!("{}={}", key, value);
    }
    for var in VARS {
        if let Some(value) = (var.read)(ctx) {
            println!("{}={}", var.name, value);
        }
    }
}

pub fn run(ctx: &Context, args: VarArgs) -> Result<ExitCode> {
    if args.list {
        list(ctx);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(var) = args.name.as_deref().and_then(lookup) else {
        eprintln!("{}", VAR_USAGE);
        return Ok(ExitCode::from(EXIT_USAGE));
    };

    match (var.read)(ctx) {
        Some(value) => {
            println!("{}", value);
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}
