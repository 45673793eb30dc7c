//! Test environment abstraction for isolated testing.
//!
//! Provides `TestEnvironment` to manage:
//! - An isolated work tree
//! - Projection hook scripts
//!
//! # Usage
//!
//! ```ignore
//! use gvfs_config::testing::TestEnvironment;
//!
//! let env = TestEnvironment::new()?;
//! let hook = env.write_hook("vfs-hook", &["src/", "README.md"])?;
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::TempDir;

/// Atomic counter for unique test IDs
static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Isolated work tree with helpers for writing hooks
pub struct TestEnvironment {
    /// Temporary directory (dropped on cleanup)
    _temp_dir: TempDir,
    /// Work-tree root for the test
    pub work_tree: PathBuf,
    /// Directory holding generated hook scripts
    pub hooks_dir: PathBuf,
    /// Unique test ID
    pub test_id: u32,
}

impl TestEnvironment {
    /// Create a new isolated test environment
    pub fn new() -> anyhow::Result<Self> {
        let test_id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        let work_tree = root.join("worktree");
        let hooks_dir = root.join("hooks");

        std::fs::create_dir_all(work_tree.join(crate::CONFIG_DIR))?;
        std::fs::create_dir_all(&hooks_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            work_tree,
            hooks_dir,
            test_id,
        })
    }

    /// Create a test file with content
    pub fn create_file(&self, relative_path: &str, content: &[u8]) -> anyhow::Result<PathBuf> {
        let path = self.work_tree.join(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Create a test directory
    pub fn create_dir(&self, relative_path: &str) -> anyhow::Result<PathBuf> {
        let path = self.work_tree.join(relative_path);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Write an executable hook that prints `entries` NUL-terminated.
    ///
    /// The hook also records its arguments and working directory to
    /// `<name>.args` next to the script.
    pub fn write_hook(&self, name: &str, entries: &[&str]) -> anyhow::Result<PathBuf> {
        let args_path = self.hooks_dir.join(format!("{name}.args"));
        let mut body = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$*\" \"$(pwd)\" > '{}'\n",
            args_path.display()
        );
        for entry in entries {
            body.push_str(&format!("printf '%s\\0' '{}'\n", entry.replace('\'', "'\\''")));
        }
        self.write_script(name, &body)
    }

    /// Write an executable hook that exits with `code` and prints nothing
    pub fn write_failing_hook(&self, name: &str, code: i32) -> anyhow::Result<PathBuf> {
        self.write_script(name, &format!("#!/bin/sh\necho 'hook failed' >&2\nexit {code}\n"))
    }

    /// Write the project config file for the work tree
    pub fn write_config(&self, toml_body: &str) -> anyhow::Result<PathBuf> {
        let path = crate::Config::project_config_path(&self.work_tree);
        std::fs::write(&path, toml_body)?;
        Ok(path)
    }

    fn write_script(&self, name: &str, body: &str) -> anyhow::Result<PathBuf> {
        let path = self.hooks_dir.join(name);
        std::fs::write(&path, body)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
        }
        Ok(path)
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new().expect("Failed to create test environment")
    }
}
