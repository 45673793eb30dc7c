//! Case policy: the hash/comparator pair shared by both pattern sets.

const FNV32_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// Selects byte-exact or ASCII-case-insensitive path matching.
///
/// Snapshotted into each set at construction so a later change to the
/// host's `ignore_case` cannot split the sets across two policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CasePolicy {
    #[default]
    Sensitive,
    Insensitive,
}

impl CasePolicy {
    pub fn from_ignore_case(ignore_case: bool) -> Self {
        if ignore_case {
            CasePolicy::Insensitive
        } else {
            CasePolicy::Sensitive
        }
    }

    pub fn ignores_case(self) -> bool {
        self == CasePolicy::Insensitive
    }

    /// 32-bit FNV-1, over upper-cased bytes when case is ignored
    pub fn hash(self, bytes: &[u8]) -> u32 {
        match self {
            CasePolicy::Sensitive => bytes
                .iter()
                .fold(FNV32_BASIS, |h, &c| h.wrapping_mul(FNV32_PRIME) ^ u32::from(c)),
            CasePolicy::Insensitive => bytes.iter().fold(FNV32_BASIS, |h, &c| {
                h.wrapping_mul(FNV32_PRIME) ^ u32::from(c.to_ascii_uppercase())
            }),
        }
    }

    pub fn eq(self, a: &[u8], b: &[u8]) -> bool {
        match self {
            CasePolicy::Sensitive => a == b,
            CasePolicy::Insensitive => a.eq_ignore_ascii_case(b),
        }
    }

    /// Directory-prefix comparison used when sweeping the sorted index
    pub fn starts_with(self, name: &[u8], prefix: &[u8]) -> bool {
        name.len() >= prefix.len() && self.eq(&name[..prefix.len()], prefix)
    }
}
