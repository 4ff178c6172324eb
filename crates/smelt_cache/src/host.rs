//! Identity of a build-tool instance.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HOST: AtomicU64 = AtomicU64::new(1);

/// Identifies one build-tool instance (one bundler compiler object).
///
/// Ids are never reused within a process, so entries of a torn-down host can
/// never be observed by a later one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct HostId(u64);

impl HostId {
    /// Allocates a fresh, process-unique host id.
    pub fn next() -> Self {
        Self(NEXT_HOST.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric id.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host#{}", self.0)
    }
}
