//! # gvfs-filter
//!
//! Virtual file system projection filter.
//!
//! A configured hook lists the paths the working tree should materialize
//! (files, and directories ending in `/`). The filter:
//!
//! - answers walker questions through [`VirtualFilesystem::is_included`]
//!   and [`VirtualFilesystem::is_excluded`], and
//! - marks every other index entry skip-worktree through
//!   [`VirtualFilesystem::apply`].
//!
//! ## Layout
//!
//! - `hook`: runs the hook, captures its NUL-delimited output
//! - `pathset`: hashed projected-pattern and ancestor-directory sets
//! - `filter`: the predicates and the lazily built state
//! - `apply`: the index sweep
//! - `global`: process-wide handle for hosts without a context object

pub mod apply;
pub mod buffer;
pub mod case;
pub mod error;
pub mod filter;
pub mod global;
pub mod hook;
pub mod index;
pub mod pathset;

pub use apply::ApplyStats;
pub use buffer::{ProjectionBuffer, Segment};
pub use case::CasePolicy;
pub use error::{Result, VfsError};
pub use filter::{DirentType, Exclusion, Inclusion, VfsSettings, VirtualFilesystem};
pub use hook::{HookMode, HookRunner, HOOK_INTERFACE_VERSION, SHELL_PATH};
pub use index::{EntryFlags, IndexEntry, IndexState, MemoryIndex};
pub use pathset::PathSet;
