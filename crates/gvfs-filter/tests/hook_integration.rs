//! Integration tests for gvfs-filter
//!
//! These run real hook scripts in a temporary work tree and drive the
//! predicates and the index sweep end to end.

#![cfg(unix)]

use gvfs_config::testing::TestEnvironment;
use gvfs_filter::{
    DirentType, Exclusion, HookMode, Inclusion, IndexState, MemoryIndex, VfsError, VfsSettings,
    VirtualFilesystem,
};

fn settings(env: &TestEnvironment, hook: &std::path::Path, ignore_case: bool) -> VfsSettings {
    VfsSettings {
        hook: Some(hook.display().to_string()),
        work_tree: env.work_tree.clone(),
        ignore_case,
        hook_mode: HookMode::Shell,
    }
}

fn skipped(index: &MemoryIndex, name: &str) -> bool {
    index.get(name.as_bytes()).unwrap().skip_worktree()
}

#[test]
fn test_apply_then_query_with_real_hook() {
    let env = TestEnvironment::new().unwrap();
    let hook = env.write_hook("vfs", &["a/b/c.txt", "src/"]).unwrap();
    let vfs = VirtualFilesystem::new(settings(&env, &hook, false));

    // Predicates never run the hook on their own
    assert_eq!(vfs.is_included(b"a/b/c.txt"), Inclusion::Undecided);

    let mut index = MemoryIndex::from_names(["a/b/c.txt", "a/b/d.txt", "src/main.c", "zz"]);
    let stats = vfs.apply(&mut index).unwrap();

    assert!(!skipped(&index, "a/b/c.txt"));
    assert!(skipped(&index, "a/b/d.txt"));
    assert!(!skipped(&index, "src/main.c"));
    assert!(skipped(&index, "zz"));
    assert_eq!(stats.nr_vfs_rows, 2);
    assert_eq!(stats.nr_vfs_dirs, 1);
    assert_eq!(stats.tracked(), stats.nr_bulk_skip + stats.nr_explicit_skip);
    assert_eq!(stats.tracked(), 2);

    assert_eq!(vfs.is_included(b"a/b/c.txt"), Inclusion::Included);
    assert_eq!(vfs.is_excluded(b"a/b/d.txt", DirentType::Regular), Exclusion::Excluded);
    assert_eq!(vfs.is_excluded(b"a", DirentType::Directory), Exclusion::Included);
    assert_eq!(vfs.is_excluded(b"a/x", DirentType::Directory), Exclusion::Excluded);
    assert_eq!(vfs.is_included(b"src/sub/x"), Inclusion::Included);
}

#[test]
fn test_hook_runs_once() {
    let env = TestEnvironment::new().unwrap();
    let counter = env.hooks_dir.join("runs");
    let hook = env.hooks_dir.join("counting");
    std::fs::write(
        &hook,
        format!(
            "#!/bin/sh\necho run >> '{}'\nprintf 'a/\\0'\n",
            counter.display()
        ),
    )
    .unwrap();
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    let vfs = VirtualFilesystem::new(settings(&env, &hook, false));
    let mut index = MemoryIndex::from_names(["a/1"]);
    vfs.apply(&mut index).unwrap();
    vfs.apply(&mut index).unwrap();
    vfs.load().unwrap();

    let runs = std::fs::read_to_string(&counter).unwrap();
    assert_eq!(runs.lines().count(), 1);
}

#[test]
fn test_free_reruns_hook() {
    let env = TestEnvironment::new().unwrap();
    let hook = env.write_hook("vfs", &["x"]).unwrap();
    let mut vfs = VirtualFilesystem::new(settings(&env, &hook, false));

    vfs.load().unwrap();
    assert_eq!(vfs.is_included(b"x"), Inclusion::Included);

    vfs.free();
    assert_eq!(vfs.is_included(b"x"), Inclusion::Undecided);

    env.write_hook("vfs", &["y"]).unwrap();
    vfs.load().unwrap();
    assert_eq!(vfs.is_included(b"x"), Inclusion::NotIncluded);
    assert_eq!(vfs.is_included(b"y"), Inclusion::Included);
}

#[test]
fn test_ignore_case_end_to_end() {
    let env = TestEnvironment::new().unwrap();
    let hook = env.write_hook("vfs", &["src/"]).unwrap();
    let vfs = VirtualFilesystem::new(settings(&env, &hook, true));

    let mut index = MemoryIndex::from_names(["Src/Main.c", "Other/file"]);
    vfs.apply(&mut index).unwrap();

    assert!(!skipped(&index, "Src/Main.c"));
    assert!(skipped(&index, "Other/file"));
    assert_eq!(vfs.is_excluded(b"SRC", DirentType::Directory), Exclusion::Included);
}

#[test]
fn test_empty_hook_output_marks_everything() {
    let env = TestEnvironment::new().unwrap();
    let hook = env.write_hook("vfs", &[]).unwrap();
    let vfs = VirtualFilesystem::new(settings(&env, &hook, false));

    let mut index = MemoryIndex::from_names(["a", "b/c"]);
    let stats = vfs.apply(&mut index).unwrap();

    assert!(index.entries().iter().all(|e| e.skip_worktree()));
    assert_eq!(stats.nr_vfs_rows, 0);
    assert_eq!(vfs.is_included(b"a"), Inclusion::Undecided);
    assert_eq!(vfs.is_excluded(b"b", DirentType::Directory), Exclusion::Undecided);
}

#[test]
fn test_failing_hook_is_fatal_error() {
    let env = TestEnvironment::new().unwrap();
    let hook = env.write_failing_hook("vfs", 1).unwrap();
    let vfs = VirtualFilesystem::new(settings(&env, &hook, false));

    let mut index = MemoryIndex::from_names(["a"]);
    let err = vfs.apply(&mut index).unwrap_err();
    assert!(matches!(err, VfsError::HookExit { .. }));
    assert!(err.to_string().contains("unable to load virtual file system"));
}

#[test]
fn test_settings_from_project_config() {
    let env = TestEnvironment::new().unwrap();
    let hook = env.write_hook("vfs", &["kept/"]).unwrap();
    env.write_config(&format!(
        "[core]\nvirtualfilesystem = \"{}\"\nignorecase = true\n",
        hook.display()
    ))
    .unwrap();

    let config = gvfs_config::Config::from_file(&gvfs_config::Config::project_config_path(
        &env.work_tree,
    ))
    .unwrap();
    let mut settings = VfsSettings::from_config(&config);
    settings.work_tree = env.work_tree.clone();
    assert!(settings.ignore_case);

    let vfs = VirtualFilesystem::new(settings);
    let mut index = MemoryIndex::from_names(["Kept/a", "gone/b"]);
    vfs.apply(&mut index).unwrap();
    assert!(!skipped(&index, "Kept/a"));
    assert!(skipped(&index, "gone/b"));
    assert_eq!(index.len(), 2);
}
