use std::process::ExitStatus;

use thiserror::Error;

/// Failures while acquiring the projection. Callers treat all of them as fatal.
#[derive(Error, Debug)]
pub enum VfsError {
    #[error("unable to load virtual file system: failed to run '{command}': {source}")]
    HookLaunch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to load virtual file system: '{command}' exited with {status}")]
    HookExit { command: String, status: ExitStatus },

    #[error("unable to load virtual file system: empty hook command")]
    InvalidHookCommand,
}

pub type Result<T> = std::result::Result<T, VfsError>;
