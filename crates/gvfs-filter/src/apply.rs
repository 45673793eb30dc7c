//! Applies the projection to an index through skip-worktree bits.

use gvfs_config::{log_apply_debug, log_apply_info};
use serde::Serialize;

use crate::error::Result;
use crate::filter::VirtualFilesystem;
use crate::index::{EntryFlags, IndexState};

/// Counters collected during one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyStats {
    /// File patterns with no matching index entry
    pub nr_unknown: u64,
    /// Directory patterns (ending in `/`)
    pub nr_vfs_dirs: u64,
    /// Patterns seen
    pub nr_vfs_rows: u64,
    /// Entries cleared through a directory pattern
    pub nr_bulk_skip: u64,
    /// Entries cleared through a file pattern
    pub nr_explicit_skip: u64,
}

impl ApplyStats {
    pub fn tracked(&self) -> u64 {
        self.nr_bulk_skip + self.nr_explicit_skip
    }
}

/// Clear `clear` on one entry if it passes the `select` mask.
/// Returns whether any of the bits were set beforehand.
fn clear_entry<I>(index: &mut I, pos: usize, select: EntryFlags, clear: EntryFlags) -> bool
where
    I: IndexState + ?Sized,
{
    let entry = index.entry_mut(pos);
    if !select.is_empty() && !entry.flags.intersects(select) {
        return false;
    }
    let was_set = entry.flags.intersects(clear);
    entry.flags.remove(clear);
    was_set
}

impl VirtualFilesystem {
    /// Clear `clear` on every entry the projection covers, among entries
    /// matching `select` (an empty `select` matches everything).
    ///
    /// Returns the size of the index, not the number of entries changed.
    pub fn clear_flags<I>(&self, index: &mut I, select: EntryFlags, clear: EntryFlags) -> Result<usize>
    where
        I: IndexState + ?Sized,
    {
        self.clear_flags_with_stats(index, select, clear)?;
        Ok(index.len())
    }

    /// The pattern sweep behind [`clear_flags`](Self::clear_flags) and
    /// [`apply`](Self::apply), returning its counters.
    pub fn clear_flags_with_stats<I>(
        &self,
        index: &mut I,
        select: EntryFlags,
        clear: EntryFlags,
    ) -> Result<ApplyStats>
    where
        I: IndexState + ?Sized,
    {
        let mut stats = ApplyStats::default();
        let Some(buf) = self.load()? else {
            return Ok(stats);
        };
        let policy = self.policy();
        let ignore_case = policy.ignores_case();

        for seg in buf.segments() {
            let pattern = seg.bytes(buf);
            stats.nr_vfs_rows += 1;

            if pattern.ends_with(b"/") {
                stats.nr_vfs_dirs += 1;

                // The projection stays immutable; case is adjusted on a copy
                let mut dir = pattern.to_vec();
                if ignore_case {
                    index.adjust_dirname_case(&mut dir);
                }

                // An exact hit would be an entry literally named "dir/"
                let Err(start) = index.name_pos(&dir) else {
                    continue;
                };
                for pos in start..index.len() {
                    if !policy.starts_with(&index.entry(pos).name, &dir) {
                        break;
                    }
                    if clear_entry(index, pos, select, clear) {
                        stats.nr_bulk_skip += 1;
                    }
                }
            } else {
                let positions = index.matching_positions(pattern, ignore_case);
                if positions.is_empty() {
                    stats.nr_unknown += 1;
                    continue;
                }
                for pos in positions {
                    if clear_entry(index, pos, select, clear) {
                        stats.nr_explicit_skip += 1;
                    }
                }
            }
        }

        log_apply_debug!(
            "Projection sweep finished",
            rows = stats.nr_vfs_rows,
            bulk = stats.nr_bulk_skip,
            explicit = stats.nr_explicit_skip,
            unknown = stats.nr_unknown
        );
        Ok(stats)
    }

    /// Mark every entry skip-worktree, then clear the bit on everything the
    /// projection covers. Does nothing when no hook is configured.
    pub fn apply<I>(&self, index: &mut I) -> Result<ApplyStats>
    where
        I: IndexState + ?Sized,
    {
        if !self.enabled() {
            return Ok(ApplyStats::default());
        }

        let span = tracing::info_span!("vfs", region = "apply");
        let _enter = span.enter();

        for pos in 0..index.len() {
            index.entry_mut(pos).flags.insert(EntryFlags::SKIP_WORKTREE);
        }

        let stats = self.clear_flags_with_stats(index, EntryFlags::NONE, EntryFlags::SKIP_WORKTREE)?;
        if stats.nr_vfs_rows > 0 {
            tracing::info!(
                target: "vfs",
                region = "apply",
                "apply/tracked" = stats.tracked(),
                "apply/vfs_rows" = stats.nr_vfs_rows,
                "apply/vfs_dirs" = stats.nr_vfs_dirs,
                "apply/nr_unknown" = stats.nr_unknown,
                "apply/nr_bulk_skip" = stats.nr_bulk_skip,
                "apply/nr_explicit_skip" = stats.nr_explicit_skip,
                "vfs apply"
            );
        }

        log_apply_info!(
            "Applied virtual file system",
            entries = index.len(),
            tracked = stats.tracked()
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::VfsSettings;
    use crate::index::{IndexEntry, MemoryIndex};

    fn projection(entries: &[&str]) -> Vec<u8> {
        entries.iter().flat_map(|e| e.bytes().chain([0])).collect()
    }

    fn vfs(ignore_case: bool, entries: &[&str]) -> VirtualFilesystem {
        let settings = VfsSettings {
            hook: Some("vfs-hook".to_string()),
            ignore_case,
            ..Default::default()
        };
        VirtualFilesystem::with_projection(settings, projection(entries))
    }

    fn skipped(index: &MemoryIndex, name: &str) -> bool {
        index.get(name.as_bytes()).unwrap().skip_worktree()
    }

    #[test]
    fn test_directory_pattern() {
        let mut index = MemoryIndex::from_names(["a/one", "a/two", "b/one"]);
        let stats = vfs(false, &["a/"]).apply(&mut index).unwrap();

        assert!(!skipped(&index, "a/one"));
        assert!(!skipped(&index, "a/two"));
        assert!(skipped(&index, "b/one"));
        assert_eq!(
            stats,
            ApplyStats {
                nr_unknown: 0,
                nr_vfs_dirs: 1,
                nr_vfs_rows: 1,
                nr_bulk_skip: 2,
                nr_explicit_skip: 0,
            }
        );
        assert_eq!(stats.tracked(), 2);
    }

    #[test]
    fn test_unknown_file_pattern() {
        let mut index = MemoryIndex::from_names(["README"]);
        let stats = vfs(false, &["missing.txt"]).apply(&mut index).unwrap();

        assert!(skipped(&index, "README"));
        assert_eq!(stats.nr_unknown, 1);
        assert_eq!(stats.tracked(), 0);
    }

    #[test]
    fn test_explicit_file_pattern() {
        let mut index = MemoryIndex::from_names(["docs/a.md", "docs/b.md"]);
        let stats = vfs(false, &["docs/b.md"]).apply(&mut index).unwrap();

        assert!(skipped(&index, "docs/a.md"));
        assert!(!skipped(&index, "docs/b.md"));
        assert_eq!(stats.nr_explicit_skip, 1);
    }

    #[test]
    fn test_ignore_case_directory() {
        let mut index = MemoryIndex::from_names(["Src/Main.c"]);
        vfs(true, &["src/"]).apply(&mut index).unwrap();
        assert!(!skipped(&index, "Src/Main.c"));
    }

    #[test]
    fn test_ignore_case_file_aliases() {
        let mut index = MemoryIndex::from_names(["README", "ReadMe", "other"]);
        let stats = vfs(true, &["readme"]).apply(&mut index).unwrap();

        assert!(!skipped(&index, "README"));
        assert!(!skipped(&index, "ReadMe"));
        assert!(skipped(&index, "other"));
        assert_eq!(stats.nr_explicit_skip, 2);
    }

    #[test]
    fn test_case_sensitive_mismatch() {
        let mut index = MemoryIndex::from_names(["Src/Main.c"]);
        let stats = vfs(false, &["src/"]).apply(&mut index).unwrap();
        assert!(skipped(&index, "Src/Main.c"));
        assert_eq!(stats.nr_bulk_skip, 0);
    }

    #[test]
    fn test_directory_prefix_does_not_match_sibling() {
        let mut index = MemoryIndex::from_names(["a/x", "a.txt", "ab/y"]);
        vfs(false, &["a/"]).apply(&mut index).unwrap();
        assert!(!skipped(&index, "a/x"));
        assert!(skipped(&index, "a.txt"));
        assert!(skipped(&index, "ab/y"));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let projection = vfs(false, &["a/", "b/one", "nope"]);
        let mut index = MemoryIndex::from_names(["a/one", "b/one", "b/two"]);

        let first = projection.apply(&mut index).unwrap();
        let after_first = index.entries().to_vec();
        let second = projection.apply(&mut index).unwrap();

        assert_eq!(first, second);
        assert_eq!(index.entries(), after_first.as_slice());
    }

    #[test]
    fn test_overlapping_patterns_count_once() {
        let mut index = MemoryIndex::from_names(["a/one", "a/two"]);
        let stats = vfs(false, &["a/", "a/one"]).apply(&mut index).unwrap();
        assert!(!skipped(&index, "a/one"));
        assert_eq!(stats.tracked(), 2);
    }

    #[test]
    fn test_disabled_leaves_flags_untouched() {
        let settings = VfsSettings::default();
        let vfs = VirtualFilesystem::with_projection(settings, projection(&["a/"]));
        let mut index = MemoryIndex::from_names(["a/one", "b/one"]);

        let stats = vfs.apply(&mut index).unwrap();
        assert_eq!(stats, ApplyStats::default());
        assert!(index.entries().iter().all(|e| e.flags.is_empty()));
    }

    #[test]
    fn test_empty_projection_skips_everything() {
        let mut index = MemoryIndex::from_names(["a", "b"]);
        let stats = vfs(false, &[]).apply(&mut index).unwrap();
        assert!(index.entries().iter().all(IndexEntry::skip_worktree));
        assert_eq!(stats.nr_vfs_rows, 0);
    }

    #[test]
    fn test_clear_flags_select_mask() {
        const MARK: EntryFlags = EntryFlags(1 << 3);
        let mut index = MemoryIndex::from_names(["a/one", "a/two"]);
        for pos in 0..index.len() {
            index.entry_mut(pos).flags.insert(EntryFlags::SKIP_WORKTREE);
        }
        index.entry_mut(0).flags.insert(MARK);

        let size = vfs(false, &["a/"])
            .clear_flags(&mut index, MARK, EntryFlags::SKIP_WORKTREE)
            .unwrap();

        assert_eq!(size, 2);
        assert!(!skipped(&index, "a/one"));
        assert!(skipped(&index, "a/two"));
    }

    #[test]
    fn test_clear_flags_reports_index_size() {
        let mut index = MemoryIndex::from_names(["x", "y", "z"]);
        let size = vfs(false, &["nothing"])
            .clear_flags(&mut index, EntryFlags::NONE, EntryFlags::SKIP_WORKTREE)
            .unwrap();
        assert_eq!(size, 3);
    }

    #[test]
    fn test_works_through_trait_object() {
        let mut index = MemoryIndex::from_names(["a/one"]);
        let dyn_index: &mut dyn IndexState = &mut index;
        vfs(false, &["a/"]).apply(dyn_index).unwrap();
        assert!(!skipped(&index, "a/one"));
    }

    #[test]
    fn test_entry_added_later_is_swept() {
        let mut index = MemoryIndex::from_names(["a/one"]);
        index.add(IndexEntry::new("a/new"));
        vfs(false, &["a/"]).apply(&mut index).unwrap();
        assert!(!skipped(&index, "a/new"));
    }

    mod telemetry {
        use super::*;
        use std::sync::{Arc, Mutex};
        use tracing::field::{Field, Visit};
        use tracing::{Event, Subscriber};
        use tracing_subscriber::layer::{Context, SubscriberExt};
        use tracing_subscriber::Layer;

        type Fields = Vec<(String, String)>;

        /// Records the fields of every event with target `vfs`
        #[derive(Clone, Default)]
        struct VfsEvents(Arc<Mutex<Vec<Fields>>>);

        struct FieldRecorder<'a>(&'a mut Fields);

        impl Visit for FieldRecorder<'_> {
            fn record_u64(&mut self, field: &Field, value: u64) {
                self.0.push((field.name().to_string(), value.to_string()));
            }

            fn record_str(&mut self, field: &Field, value: &str) {
                self.0.push((field.name().to_string(), value.to_string()));
            }

            fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
                self.0.push((field.name().to_string(), format!("{value:?}")));
            }
        }

        impl<S: Subscriber> Layer<S> for VfsEvents {
            fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
                if event.metadata().target() != "vfs" {
                    return;
                }
                let mut fields = Fields::new();
                event.record(&mut FieldRecorder(&mut fields));
                self.0.lock().unwrap().push(fields);
            }
        }

        fn capture(entries: &[&str], index: &mut MemoryIndex) -> Vec<Fields> {
            let events = VfsEvents::default();
            let subscriber = tracing_subscriber::registry().with(events.clone());
            tracing::subscriber::with_default(subscriber, || {
                vfs(false, entries).apply(index).unwrap();
            });
            let captured = events.0.lock().unwrap().clone();
            captured
        }

        fn field<'a>(fields: &'a Fields, name: &str) -> Option<&'a str> {
            fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        }

        #[test]
        fn test_apply_emits_counters() {
            let mut index = MemoryIndex::from_names(["a/one", "a/two", "b/one"]);
            let events = capture(&["a/"], &mut index);

            assert_eq!(events.len(), 1);
            let fields = &events[0];
            assert_eq!(field(fields, "region"), Some("apply"));
            assert_eq!(field(fields, "apply/tracked"), Some("2"));
            assert_eq!(field(fields, "apply/vfs_rows"), Some("1"));
            assert_eq!(field(fields, "apply/vfs_dirs"), Some("1"));
            assert_eq!(field(fields, "apply/nr_unknown"), Some("0"));
            assert_eq!(field(fields, "apply/nr_bulk_skip"), Some("2"));
            assert_eq!(field(fields, "apply/nr_explicit_skip"), Some("0"));
        }

        #[test]
        fn test_apply_without_rows_is_silent() {
            let mut index = MemoryIndex::from_names(["a/one"]);
            let events = capture(&[], &mut index);
            assert!(events.is_empty());
            assert!(skipped(&index, "a/one"));
        }
    }
}
