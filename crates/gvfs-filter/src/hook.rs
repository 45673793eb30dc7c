//! Projection source: runs the configured hook and captures its output.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use gvfs_config::{log_hook_debug, log_hook_error, log_hook_info};

use crate::buffer::ProjectionBuffer;
use crate::error::{Result, VfsError};

/// Interface version passed as the hook's only argument
pub const HOOK_INTERFACE_VERSION: u32 = 1;

/// Initial capacity of the capture buffer
const CAPTURE_HINT: usize = 1024;

/// Shell used for [`HookMode::Shell`]
pub const SHELL_PATH: &str = "/bin/sh";

/// How the hook command line is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookMode {
    /// `sh -c '<command> "$@"'`, so user command lines may carry arguments,
    /// pipes and quoting
    #[default]
    Shell,
    /// Split on whitespace and exec directly
    Direct,
}

impl HookMode {
    pub fn from_shell_flag(use_shell: bool) -> Self {
        if use_shell {
            HookMode::Shell
        } else {
            HookMode::Direct
        }
    }
}

#[derive(Debug, Clone)]
pub struct HookRunner {
    command: String,
    work_tree: PathBuf,
    mode: HookMode,
}

impl HookRunner {
    pub fn new(command: impl Into<String>, work_tree: impl Into<PathBuf>, mode: HookMode) -> Self {
        Self {
            command: command.into(),
            work_tree: work_tree.into(),
            mode,
        }
    }

    fn build(&self) -> Result<Command> {
        let version = HOOK_INTERFACE_VERSION.to_string();
        let mut cmd = match self.mode {
            HookMode::Shell => {
                let mut cmd = Command::new(SHELL_PATH);
                cmd.arg("-c")
                    .arg(format!("{} \"$@\"", self.command))
                    .arg(&self.command)
                    .arg(version);
                cmd
            }
            HookMode::Direct => {
                let mut parts = self.command.split_whitespace();
                let program = parts.next().ok_or(VfsError::InvalidHookCommand)?;
                let mut cmd = Command::new(program);
                cmd.args(parts).arg(version);
                cmd
            }
        };
        cmd.current_dir(&self.work_tree)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        Ok(cmd)
    }

    /// Run the hook to completion and return everything it wrote to stdout.
    ///
    /// Blocks until the hook exits; a non-zero exit is an error.
    pub fn run(&self) -> Result<ProjectionBuffer> {
        log_hook_debug!(
            "Running virtual file system hook",
            command = self.command.as_str(),
            work_tree = self.work_tree.display().to_string()
        );

        let launch_err = |source| VfsError::HookLaunch {
            command: self.command.clone(),
            source,
        };

        let mut child = self.build()?.spawn().map_err(launch_err)?;

        let mut data = Vec::with_capacity(CAPTURE_HINT);
        if let Some(mut stdout) = child.stdout.take() {
            stdout.read_to_end(&mut data).map_err(launch_err)?;
        }
        let status = child.wait().map_err(launch_err)?;

        if !status.success() {
            log_hook_error!(
                "Virtual file system hook failed",
                command = self.command.as_str(),
                status = status.to_string()
            );
            return Err(VfsError::HookExit {
                command: self.command.clone(),
                status,
            });
        }

        log_hook_info!("Projection loaded", bytes = data.len());
        Ok(ProjectionBuffer::from(data))
    }
}
