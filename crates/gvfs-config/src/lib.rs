//! # gvfs-config
//!
//! Configuration management for the gvfs projection filter.
//!
//! Loads configuration from:
//! 1. `~/.gvfs/config.toml` (global)
//! 2. `<worktree>/.gvfs/config.toml` (project-local, overrides global)
//! 3. Environment variables (highest priority)

pub mod logging;
pub mod path;
pub mod testing;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// Directory holding per-work-tree and global config files
pub const CONFIG_DIR: &str = ".gvfs";

/// Global config instance
static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::load().unwrap_or_default()));

/// Get global config (read-only)
pub fn config() -> std::sync::RwLockReadGuard<'static, Config> {
    CONFIG.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Reload config from disk
pub fn reload() -> Result<(), ConfigError> {
    let new_config = Config::load()?;
    *CONFIG.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = new_config;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub core: CoreConfig,
}

/// `[core]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Hook command producing the projection (`core.virtualfilesystem`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtualfilesystem: Option<String>,
    /// Case-insensitive path matching (`core.ignorecase`)
    pub ignorecase: bool,
    /// Run the hook through `sh -c` (`core.virtualfilesystemshell`)
    #[serde(rename = "virtualfilesystemshell")]
    pub hook_shell: bool,
    /// Explicit work-tree root (`core.worktree`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worktree: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            virtualfilesystem: None,
            ignorecase: false,
            hook_shell: true,
            worktree: None,
        }
    }
}

impl Config {
    /// Load config from standard locations, discovering the work tree from
    /// the current directory.
    pub fn load() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir()?;
        let work_tree = path::discover_work_tree(&cwd).unwrap_or(cwd);
        Self::load_for(&work_tree)
    }

    /// Load config for a known work tree
    pub fn load_for(work_tree: &Path) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // 1. Global config (~/.gvfs/config.toml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                debug!("Loading global config from {:?}", global_path);
                config = Self::from_file(&global_path)?;
            }
        }

        // 2. Project config (<worktree>/.gvfs/config.toml) - overrides global
        let project_path = Self::project_config_path(work_tree);
        if project_path.exists() {
            debug!("Loading project config from {:?}", project_path);
            config.merge(Self::from_file(&project_path)?);
        }

        // 3. Environment overrides
        config.apply_env_overrides();

        if config.core.worktree.is_none() {
            config.core.worktree = Some(work_tree.to_path_buf());
        }

        Ok(config)
    }

    /// Parse a single config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Global config path: ~/.gvfs/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR).join("config.toml"))
    }

    /// Project config path: <worktree>/.gvfs/config.toml
    pub fn project_config_path(work_tree: &Path) -> PathBuf {
        work_tree.join(CONFIG_DIR).join("config.toml")
    }

    /// Merge another config (project overrides non-default values)
    fn merge(&mut self, other: Config) {
        let defaults = CoreConfig::default();
        if other.core.virtualfilesystem.is_some() {
            self.core.virtualfilesystem = other.core.virtualfilesystem;
        }
        if other.core.ignorecase != defaults.ignorecase {
            self.core.ignorecase = other.core.ignorecase;
        }
        if other.core.hook_shell != defaults.hook_shell {
            self.core.hook_shell = other.core.hook_shell;
        }
        if other.core.worktree.is_some() {
            self.core.worktree = other.core.worktree;
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(hook) = std::env::var("GVFS_VIRTUALFILESYSTEM") {
            self.core.virtualfilesystem = Some(hook);
        }
        if let Ok(value) = std::env::var("GVFS_IGNORECASE") {
            if let Some(flag) = parse_bool(&value) {
                self.core.ignorecase = flag;
            }
        }
        if let Ok(tree) = std::env::var("GVFS_WORK_TREE") {
            self.core.worktree = Some(PathBuf::from(tree));
        }
    }

    /// The configured hook command, if the virtual filesystem is enabled.
    ///
    /// An unset or blank `core.virtualfilesystem` disables the filter.
    pub fn virtual_filesystem(&self) -> Option<&str> {
        self.core
            .virtualfilesystem
            .as_deref()
            .map(str::trim)
            .filter(|cmd| !cmd.is_empty())
    }

    /// Work-tree root, falling back to the current directory
    pub fn work_tree(&self) -> PathBuf {
        self.core
            .worktree
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Look up a dotted key such as `core.virtualfilesystem`
    pub fn get(&self, key: &str) -> Option<String> {
        match key.to_ascii_lowercase().as_str() {
            "core.virtualfilesystem" => self.core.virtualfilesystem.clone(),
            "core.ignorecase" => Some(self.core.ignorecase.to_string()),
            "core.virtualfilesystemshell" => Some(self.core.hook_shell.to_string()),
            "core.worktree" => self
                .core
                .worktree
                .as_ref()
                .map(|p| p.display().to_string()),
            _ => None,
        }
    }

    /// All set keys with their values, in a stable order
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        [
            "core.virtualfilesystem",
            "core.ignorecase",
            "core.virtualfilesystemshell",
            "core.worktree",
        ]
        .into_iter()
        .filter_map(|key| self.get(key).map(|value| (key, value)))
        .collect()
    }

    /// Generate default config TOML string
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

/// Parse the boolean spellings accepted in environment overrides
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
