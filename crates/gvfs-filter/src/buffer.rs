//! Raw projection buffer and the NUL-delimited segments inside it.

use std::sync::Arc;

/// Hook output, held for the process lifetime.
///
/// Pattern sets keep spans into this buffer instead of copies; cloning
/// only bumps the shared count.
#[derive(Debug, Clone, Default)]
pub struct ProjectionBuffer {
    data: Arc<[u8]>,
}

/// One projected pattern, as an offset + length into the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub len: usize,
}

impl Segment {
    pub fn bytes(self, buf: &ProjectionBuffer) -> &[u8] {
        &buf.data[self.start..self.start + self.len]
    }

    /// A span covering only the first `len` bytes of this segment
    pub fn prefix(self, len: usize) -> Segment {
        debug_assert!(len <= self.len);
        Segment {
            start: self.start,
            len,
        }
    }
}

impl ProjectionBuffer {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Every non-empty entry between NUL separators.
    ///
    /// A final entry without a terminating NUL still counts.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let mut start = 0;
        self.data.split(|&b| b == 0).filter_map(move |chunk| {
            let seg = Segment {
                start,
                len: chunk.len(),
            };
            start += chunk.len() + 1;
            (seg.len > 0).then_some(seg)
        })
    }
}

impl From<Vec<u8>> for ProjectionBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for ProjectionBuffer {
    fn from(data: &[u8]) -> Self {
        Self::new(data)
    }
}
