//! Work-tree path utilities.
//!
//! The filter speaks in repository-root-relative byte strings with `/`
//! separators; these helpers bridge filesystem paths into that form.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// Markers identifying a work-tree root
const WORK_TREE_MARKERS: &[&str] = &[crate::CONFIG_DIR, ".git"];

/// Find the nearest ancestor of `start` (inclusive) that looks like a work tree.
pub fn discover_work_tree(start: impl AsRef<Path>) -> Option<PathBuf> {
    start
        .as_ref()
        .ancestors()
        .find(|dir| WORK_TREE_MARKERS.iter().any(|m| dir.join(m).exists()))
        .map(Path::to_path_buf)
}

/// Convert a path under `root` into the root-relative, `/`-separated form.
///
/// Relative paths are taken as already relative to `root`. `.` components
/// are dropped; `..` and paths outside `root` are rejected.
///
/// # Example
/// ```ignore
/// let rel = to_repo_relative("/repo/src/main.rs", "/repo")?;
/// assert_eq!(rel, b"src/main.rs");
/// ```
pub fn to_repo_relative(path: impl AsRef<Path>, root: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let root = root.as_ref();

    let relative = if path.is_absolute() {
        path.strip_prefix(root).with_context(|| {
            format!(
                "Path '{}' is outside work tree '{}'",
                path.display(),
                root.display()
            )
        })?
    } else {
        path
    };

    let mut out = Vec::new();
    for component in relative.components() {
        match component {
            Component::CurDir => continue,
            Component::Normal(name) => {
                if !out.is_empty() {
                    out.push(b'/');
                }
                out.extend_from_slice(name.to_string_lossy().as_bytes());
            }
            _ => anyhow::bail!(
                "Path '{}' is outside work tree '{}'",
                path.display(),
                root.display()
            ),
        }
    }
    Ok(out)
}
