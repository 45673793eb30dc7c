//! Process-wide filter handle.
//!
//! Hosts that consult the filter from deep inside a walk (where threading a
//! `&VirtualFilesystem` through is impractical) install one instance here
//! at startup and release it at shutdown with [`free`].

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::apply::ApplyStats;
use crate::error::Result;
use crate::filter::{DirentType, Exclusion, Inclusion, VfsSettings, VirtualFilesystem};
use crate::index::IndexState;

static VFS: Lazy<RwLock<Option<Arc<VirtualFilesystem>>>> = Lazy::new(|| RwLock::new(None));

fn slot() -> std::sync::RwLockWriteGuard<'static, Option<Arc<VirtualFilesystem>>> {
    VFS.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Install a filter built from `settings`, replacing any previous one
pub fn init(settings: VfsSettings) -> Arc<VirtualFilesystem> {
    install(VirtualFilesystem::new(settings))
}

/// Install a filter built from the global configuration
pub fn init_from_config() -> Arc<VirtualFilesystem> {
    let settings = VfsSettings::from_config(&gvfs_config::config());
    init(settings)
}

/// Install an already constructed filter
pub fn install(vfs: VirtualFilesystem) -> Arc<VirtualFilesystem> {
    let vfs = Arc::new(vfs);
    *slot() = Some(Arc::clone(&vfs));
    vfs
}

/// The installed filter, if any
pub fn current() -> Option<Arc<VirtualFilesystem>> {
    VFS.read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

pub fn is_included(path: &[u8]) -> Inclusion {
    current().map_or(Inclusion::Undecided, |vfs| vfs.is_included(path))
}

pub fn is_excluded(path: &[u8], dtype: DirentType) -> Exclusion {
    current().map_or(Exclusion::Undecided, |vfs| vfs.is_excluded(path, dtype))
}

/// Apply the installed filter; a no-op without one
pub fn apply<I>(index: &mut I) -> Result<ApplyStats>
where
    I: IndexState + ?Sized,
{
    match current() {
        Some(vfs) => vfs.apply(index),
        None => Ok(ApplyStats::default()),
    }
}

/// Drop the projection and both sets, keeping the settings.
///
/// Handles obtained from [`current`] before the call keep the old data
/// alive until they are dropped.
pub fn free() {
    let mut slot = slot();
    if let Some(old) = slot.take() {
        *slot = Some(Arc::new(VirtualFilesystem::new(old.settings().clone())));
    }
}

/// Remove the installed filter entirely
pub fn uninstall() {
    slot().take();
}
