//! Index contract consumed by the applier, plus an in-memory index.
//!
//! The filter only reads entry names and flips flag bits; everything else
//! about the index belongs to its owner.

use std::collections::HashMap;
use std::io::{self, Read};

/// Per-entry flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct EntryFlags(pub u32);

impl EntryFlags {
    pub const NONE: EntryFlags = EntryFlags(0);
    /// Omit the entry from checkout, status and diff
    pub const SKIP_WORKTREE: EntryFlags = EntryFlags(1 << 30);

    pub fn contains(self, other: EntryFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: EntryFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: EntryFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: EntryFlags) {
        self.0 &= !other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: Vec<u8>,
    pub flags: EntryFlags,
}

impl IndexEntry {
    pub fn new(name: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            flags: EntryFlags::NONE,
        }
    }

    pub fn skip_worktree(&self) -> bool {
        self.flags.contains(EntryFlags::SKIP_WORKTREE)
    }
}

/// Sorted-by-name index the applier can sweep.
pub trait IndexState {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, pos: usize) -> &IndexEntry;

    fn entry_mut(&mut self, pos: usize) -> &mut IndexEntry;

    /// `Ok(pos)` for an exact (byte-wise) match, otherwise `Err(pos)` with
    /// the position of the first entry sorting after `name`.
    fn name_pos(&self, name: &[u8]) -> Result<usize, usize>;

    /// Rewrite the leading directories of `name` to the case the index
    /// already uses for them. No-op for unknown directories.
    fn adjust_dirname_case(&self, name: &mut [u8]);

    /// Positions of entries naming `name`: the exact hit, or with
    /// `ignore_case` every alias differing only in ASCII case.
    fn matching_positions(&self, name: &[u8], ignore_case: bool) -> Vec<usize>;
}

/// `Vec`-backed index sorted by name, with case-folded lookups rebuilt on change.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    entries: Vec<IndexEntry>,
    folded: FoldedNames,
}

#[derive(Debug, Clone, Default)]
struct FoldedNames {
    /// Folded name -> positions of entries with that name
    files: HashMap<Vec<u8>, Vec<usize>>,
    /// Folded `dir/` prefix -> spelling of the first entry under it
    dirs: HashMap<Vec<u8>, Vec<u8>>,
}

impl FoldedNames {
    fn build(entries: &[IndexEntry]) -> Self {
        let mut folded = FoldedNames::default();
        for (pos, entry) in entries.iter().enumerate() {
            folded
                .files
                .entry(entry.name.to_ascii_lowercase())
                .or_default()
                .push(pos);
            for (i, _) in entry.name.iter().enumerate().filter(|(_, &b)| b == b'/') {
                let dir = &entry.name[..=i];
                folded
                    .dirs
                    .entry(dir.to_ascii_lowercase())
                    .or_insert_with(|| dir.to_vec());
            }
        }
        folded
    }
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from names; duplicates collapse and entries start with no flags
    pub fn from_names<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Vec<u8>>,
    {
        let mut entries: Vec<IndexEntry> = names.into_iter().map(IndexEntry::new).collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.dedup_by(|a, b| a.name == b.name);
        let folded = FoldedNames::build(&entries);
        Self { entries, folded }
    }

    /// Read a path list separated by NUL or newlines.
    ///
    /// Input containing any NUL is split on NUL only, so names may carry
    /// newlines in that form.
    pub fn read_from(mut reader: impl Read) -> io::Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let sep = if data.contains(&0) { 0 } else { b'\n' };
        let names = data
            .split(|&b| b == sep)
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .filter(|line| !line.is_empty())
            .map(<[u8]>::to_vec);
        Ok(Self::from_names(names))
    }

    /// Add an entry keeping the sort order; an existing name is replaced
    pub fn add(&mut self, entry: IndexEntry) {
        match self.name_pos(&entry.name) {
            Ok(pos) => self.entries[pos] = entry,
            Err(pos) => self.entries.insert(pos, entry),
        }
        self.folded = FoldedNames::build(&self.entries);
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn get(&self, name: &[u8]) -> Option<&IndexEntry> {
        self.name_pos(name).ok().map(|pos| &self.entries[pos])
    }
}

impl IndexState for MemoryIndex {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn entry(&self, pos: usize) -> &IndexEntry {
        &self.entries[pos]
    }

    fn entry_mut(&mut self, pos: usize) -> &mut IndexEntry {
        &mut self.entries[pos]
    }

    fn name_pos(&self, name: &[u8]) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|entry| entry.name.as_slice().cmp(name))
    }

    fn adjust_dirname_case(&self, name: &mut [u8]) {
        let dirs = &self.folded.dirs;
        let mut i = 0;
        while let Some(offset) = name[i..].iter().position(|&b| b == b'/') {
            let end = i + offset + 1;
            match dirs.get(&name[..end].to_ascii_lowercase()) {
                Some(spelling) => name[..end].copy_from_slice(spelling),
                None => break,
            }
            i = end;
        }
    }

    fn matching_positions(&self, name: &[u8], ignore_case: bool) -> Vec<usize> {
        if ignore_case {
            self.folded
                .files
                .get(&name.to_ascii_lowercase())
                .cloned()
                .unwrap_or_default()
        } else {
            self.name_pos(name).ok().into_iter().collect()
        }
    }
}
