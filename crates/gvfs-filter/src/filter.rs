//! Inclusion and exclusion predicates for the directory walker.
//!
//! Both predicates are tri-state: when the filter has nothing to say (no
//! hook configured, nothing loaded yet, or an empty projection) they answer
//! `Undecided` and the walker falls back to its own policy.

use std::path::PathBuf;

use gvfs_config::{log_filter_debug, log_filter_trace, Config};
use once_cell::sync::OnceCell;

use crate::buffer::ProjectionBuffer;
use crate::case::CasePolicy;
use crate::error::Result;
use crate::hook::{HookMode, HookRunner};
use crate::pathset::PathSet;

/// Inputs the filter snapshots at construction
#[derive(Debug, Clone, Default)]
pub struct VfsSettings {
    /// Hook command line; `None` or blank disables the filter
    pub hook: Option<String>,
    /// Working directory for the hook
    pub work_tree: PathBuf,
    pub ignore_case: bool,
    pub hook_mode: HookMode,
}

impl VfsSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            hook: config.virtual_filesystem().map(str::to_string),
            work_tree: config.work_tree(),
            ignore_case: config.core.ignorecase,
            hook_mode: HookMode::from_shell_flag(config.core.hook_shell),
        }
    }

    pub fn hook(&self) -> Option<&str> {
        self.hook
            .as_deref()
            .map(str::trim)
            .filter(|cmd| !cmd.is_empty())
    }

    pub fn enabled(&self) -> bool {
        self.hook().is_some()
    }
}

/// Answer of [`VirtualFilesystem::is_included`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    Included,
    NotIncluded,
    Undecided,
}

impl Inclusion {
    /// `1`, `0` or `-1`
    pub fn code(self) -> i32 {
        match self {
            Inclusion::Included => 1,
            Inclusion::NotIncluded => 0,
            Inclusion::Undecided => -1,
        }
    }
}

/// Answer of [`VirtualFilesystem::is_excluded`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    Excluded,
    Included,
    Undecided,
}

impl Exclusion {
    /// `1` exclude, `0` include, `-1` undecided
    pub fn code(self) -> i32 {
        match self {
            Exclusion::Excluded => 1,
            Exclusion::Included => 0,
            Exclusion::Undecided => -1,
        }
    }
}

/// Directory-entry type reported by the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirentType {
    Regular,
    Symlink,
    Directory,
    /// Raw `d_type` of anything else; never valid for the filter
    Other(u8),
}

impl DirentType {
    pub fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            DirentType::Symlink
        } else if file_type.is_dir() {
            DirentType::Directory
        } else if file_type.is_file() {
            DirentType::Regular
        } else {
            DirentType::Other(0)
        }
    }
}

/// Projection-backed filter.
///
/// The buffer and both sets are built at most once each, behind
/// [`OnceCell`] barriers, and are read-only afterwards.
#[derive(Debug)]
pub struct VirtualFilesystem {
    settings: VfsSettings,
    policy: CasePolicy,
    buffer: OnceCell<ProjectionBuffer>,
    projected: OnceCell<PathSet>,
    ancestors: OnceCell<PathSet>,
}

impl VirtualFilesystem {
    pub fn new(settings: VfsSettings) -> Self {
        let policy = CasePolicy::from_ignore_case(settings.ignore_case);
        Self {
            settings,
            policy,
            buffer: OnceCell::new(),
            projected: OnceCell::new(),
            ancestors: OnceCell::new(),
        }
    }

    /// Filter whose projection is already known; the hook is never run.
    pub fn with_projection(settings: VfsSettings, data: impl Into<ProjectionBuffer>) -> Self {
        let vfs = Self::new(settings);
        let _ = vfs.buffer.set(data.into());
        vfs
    }

    pub fn settings(&self) -> &VfsSettings {
        &self.settings
    }

    pub fn policy(&self) -> CasePolicy {
        self.policy
    }

    pub fn enabled(&self) -> bool {
        self.settings.enabled()
    }

    /// Run the hook if it has not run yet.
    ///
    /// `Ok(None)` when no hook is configured.
    pub fn load(&self) -> Result<Option<&ProjectionBuffer>> {
        let Some(command) = self.settings.hook() else {
            return Ok(None);
        };
        let buf = self.buffer.get_or_try_init(|| {
            HookRunner::new(command, &self.settings.work_tree, self.settings.hook_mode).run()
        })?;
        Ok(Some(buf))
    }

    /// Projection bytes, if loaded
    pub fn projection(&self) -> Option<&ProjectionBuffer> {
        self.buffer.get()
    }

    fn projected_set(&self) -> Option<&PathSet> {
        let buf = self.buffer.get().filter(|b| !b.is_empty())?;
        let set = self.projected.get_or_init(|| {
            let set = PathSet::projected(buf, self.policy);
            log_filter_debug!("Built projected path set", patterns = set.len());
            set
        });
        Some(set)
    }

    fn ancestor_set(&self) -> Option<&PathSet> {
        let buf = self.buffer.get().filter(|b| !b.is_empty())?;
        let set = self.ancestors.get_or_init(|| {
            let set = PathSet::ancestors(buf, self.policy);
            log_filter_debug!("Built ancestor directory set", prefixes = set.len());
            set
        });
        Some(set)
    }

    /// Is `path` projected, either directly or through an ancestor `dir/`?
    pub fn is_included(&self, path: &[u8]) -> Inclusion {
        if !self.enabled() {
            return Inclusion::Undecided;
        }
        let Some(set) = self.projected_set() else {
            return Inclusion::Undecided;
        };

        if set.contains(path) {
            return Inclusion::Included;
        }

        // One probe per component: "a/b/foo.txt" checks "a/" then "a/b/"
        let hit = path
            .iter()
            .enumerate()
            .filter(|(_, &b)| b == b'/')
            .any(|(slash, _)| set.contains(&path[..=slash]));

        if hit {
            Inclusion::Included
        } else {
            Inclusion::NotIncluded
        }
    }

    /// Should the walker skip `path`?
    ///
    /// Directories that are not projected themselves are still included
    /// when something below them is.
    ///
    /// # Panics
    ///
    /// On [`DirentType::Other`]; the walker must only ask about files,
    /// symlinks and directories.
    pub fn is_excluded(&self, path: &[u8], dtype: DirentType) -> Exclusion {
        if !self.enabled() {
            return Exclusion::Undecided;
        }

        let answer = match dtype {
            DirentType::Regular | DirentType::Symlink => match self.is_included(path) {
                Inclusion::Included => Exclusion::Included,
                Inclusion::NotIncluded => Exclusion::Excluded,
                Inclusion::Undecided => Exclusion::Undecided,
            },
            DirentType::Directory => {
                if self.is_included(path) == Inclusion::Included {
                    Exclusion::Included
                } else {
                    match self.ancestor_set() {
                        None => Exclusion::Undecided,
                        Some(ancestors) => {
                            let mut dir = Vec::with_capacity(path.len() + 1);
                            dir.extend_from_slice(path);
                            dir.push(b'/');
                            if ancestors.contains(&dir) {
                                Exclusion::Included
                            } else {
                                Exclusion::Excluded
                            }
                        }
                    }
                }
            }
            DirentType::Other(raw) => {
                panic!("is_excluded_from_virtualfilesystem passed unhandled dtype {raw}")
            }
        };

        log_filter_trace!(
            "is_excluded",
            path = String::from_utf8_lossy(path).into_owned(),
            answer = answer.code()
        );
        answer
    }

    /// Release the projection and both sets; the next load reruns the hook.
    pub fn free(&mut self) {
        self.projected.take();
        self.ancestors.take();
        self.buffer.take();
    }
}
