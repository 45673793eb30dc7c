//! Hashed pattern sets over the projection buffer.
//!
//! - Projected set: every pattern verbatim (files and `dir/` prefixes).
//! - Ancestor set: every slash-terminated prefix of every pattern, used to
//!   decide whether the walker must descend into a directory.
//!
//! Entries are spans into a shared [`ProjectionBuffer`]; hashing and
//! equality follow the [`CasePolicy`] captured at build time.

use std::collections::HashMap;

use crate::buffer::{ProjectionBuffer, Segment};
use crate::case::CasePolicy;

#[derive(Debug, Clone)]
pub struct PathSet {
    buf: ProjectionBuffer,
    policy: CasePolicy,
    buckets: HashMap<u32, Vec<Segment>>,
    len: usize,
}

impl PathSet {
    fn empty(buf: &ProjectionBuffer, policy: CasePolicy) -> Self {
        Self {
            buf: buf.clone(),
            policy,
            buckets: HashMap::new(),
            len: 0,
        }
    }

    /// Set of projected patterns
    pub fn projected(buf: &ProjectionBuffer, policy: CasePolicy) -> Self {
        let mut set = Self::empty(buf, policy);
        for seg in buf.segments() {
            set.insert(seg);
        }
        set
    }

    /// Set of directory prefixes leading up to (and including) each pattern.
    ///
    /// Slash scanning starts at offset 1, so a leading `/` never yields the
    /// bare root prefix. A directory pattern contributes itself.
    pub fn ancestors(buf: &ProjectionBuffer, policy: CasePolicy) -> Self {
        let mut set = Self::empty(buf, policy);
        for seg in buf.segments() {
            if seg.len <= 1 {
                continue;
            }
            let slashes: Vec<usize> = seg
                .bytes(buf)
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(_, &b)| b == b'/')
                .map(|(i, _)| i)
                .collect();
            for slash in slashes {
                set.insert(seg.prefix(slash + 1));
            }
        }
        set
    }

    /// Insert unless an equal entry (under the policy) is present
    fn insert(&mut self, seg: Segment) -> bool {
        let bytes = seg.bytes(&self.buf);
        let hash = self.policy.hash(bytes);
        let bucket = self.buckets.entry(hash).or_default();
        if bucket
            .iter()
            .any(|existing| self.policy.eq(existing.bytes(&self.buf), bytes))
        {
            return false;
        }
        bucket.push(seg);
        self.len += 1;
        true
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.buckets
            .get(&self.policy.hash(key))
            .is_some_and(|bucket| {
                bucket
                    .iter()
                    .any(|seg| self.policy.eq(seg.bytes(&self.buf), key))
            })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over the stored patterns in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.buckets
            .values()
            .flatten()
            .map(move |seg| seg.bytes(&self.buf))
    }
}
