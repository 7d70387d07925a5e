//! Dedup gate: identities already emitted or in flight for this run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Identity of a discovered path: the canonical path, or the path itself when it cannot be resolved.
/// Symlink aliases and `..` detours collapse to the same identity.
pub fn identity_of(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Stable, order-preserving dedup of `paths` by identity. First occurrence wins.
/// Returns `(path, identity)` pairs.
pub fn dedup_bucket(paths: Vec<PathBuf>) -> Vec<(PathBuf, PathBuf)> {
    let mut seen = HashSet::with_capacity(paths.len());
    paths
        .into_iter()
        .filter_map(|p| {
            let id = identity_of(&p);
            seen.insert(id.clone()).then_some((p, id))
        })
        .collect()
}

/// Mutex-guarded set of claimed identities. Monotonic: entries are never removed during a run.
#[derive(Debug, Default)]
pub struct DedupGate {
    seen: Mutex<HashSet<PathBuf>>,
}

impl DedupGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_or_recover(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.seen.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn contains(&self, id: &Path) -> bool {
        self.lock_or_recover().contains(id)
    }

    /// Atomically check-and-mark. Returns true when this caller claimed `id`; false when it was
    /// already claimed.
    pub fn claim(&self, id: &Path) -> bool {
        let mut seen = self.lock_or_recover();
        if seen.contains(id) {
            return false;
        }
        seen.insert(id.to_path_buf())
    }

    pub fn len(&self) -> usize {
        self.lock_or_recover().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
