//! Category index: category key → candidate paths, filled by the walk and taken once by dispatch.

use log::trace;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use super::filter::normalize_category;

/// One category's paths as handed to the dispatcher. Owned; the index keeps nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    pub category: String,
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Default)]
struct Inner {
    buckets: BTreeMap<String, Vec<PathBuf>>,
    frozen: bool,
}

/// Mutex-guarded ordered map of registered categories.
///
/// Only registered categories accept paths. Once [`take_buckets`](Self::take_buckets) runs the index
/// is frozen and later appends are refused, so a bucket never changes after dispatch gets it.
#[derive(Debug, Default)]
pub struct CategoryIndex {
    inner: Mutex<Inner>,
}

impl CategoryIndex {
    /// Build an index with one (empty) bucket per include entry. Duplicates collapse.
    pub fn with_categories<S: AsRef<str>>(include: &[S]) -> Self {
        let index = Self::default();
        for c in include {
            index.register(c.as_ref());
        }
        index
    }

    fn lock_or_recover(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Register a category. Returns false when it was already registered, empty, or the index is frozen.
    pub fn register(&self, raw: &str) -> bool {
        let key = normalize_category(raw);
        if key.is_empty() {
            return false;
        }
        let mut inner = self.lock_or_recover();
        if inner.frozen || inner.buckets.contains_key(&key) {
            return false;
        }
        inner.buckets.insert(key, Vec::new());
        true
    }

    pub fn is_registered(&self, category: &str) -> bool {
        self.lock_or_recover().buckets.contains_key(category)
    }

    /// Append `path` to `category`'s bucket. Returns false (path dropped) when the category is not
    /// registered or the index is frozen.
    pub fn insert(&self, category: &str, path: PathBuf) -> bool {
        let mut inner = self.lock_or_recover();
        if inner.frozen {
            trace!("index frozen, dropping {}", path.display());
            return false;
        }
        match inner.buckets.get_mut(category) {
            Some(paths) => {
                paths.push(path);
                true
            }
            None => false,
        }
    }

    /// Registered category keys, ordered.
    pub fn categories(&self) -> Vec<String> {
        self.lock_or_recover().buckets.keys().cloned().collect()
    }

    /// Number of paths in `category`, if registered.
    pub fn len_of(&self, category: &str) -> Option<usize> {
        self.lock_or_recover().buckets.get(category).map(Vec::len)
    }

    /// Total paths across all buckets.
    pub fn total_paths(&self) -> usize {
        self.lock_or_recover().buckets.values().map(Vec::len).sum()
    }

    pub fn is_frozen(&self) -> bool {
        self.lock_or_recover().frozen
    }

    /// Freeze the index and move every bucket out (empty buckets included). Categories stay
    /// registered with empty lists. A second call returns only empty buckets.
    pub fn take_buckets(&self) -> Vec<Bucket> {
        let mut inner = self.lock_or_recover();
        inner.frozen = true;
        inner
            .buckets
            .iter_mut()
            .map(|(category, paths)| Bucket {
                category: category.clone(),
                paths: std::mem::take(paths),
            })
            .collect()
    }
}
