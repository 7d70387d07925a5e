//! Path and list utilities

use anyhow::{Context, Result, bail};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Path as a `/`-separated string, so skip entries like `node_modules/` match on every platform.
pub fn path_to_slash_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Canonicalize `path` and make sure it is a directory we can list.
pub fn check_readable_dir_and_canonicalize(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("canonicalize source dir {}", path.display()))?;
    let meta = std::fs::metadata(&canonical)
        .with_context(|| format!("read metadata of {}", canonical.display()))?;
    if !meta.is_dir() {
        bail!("{} is not a directory", canonical.display());
    }
    std::fs::read_dir(&canonical)
        .with_context(|| format!("source dir {} is not readable", canonical.display()))?;
    Ok(canonical)
}

/// Remove duplicates keeping the first occurrence of each entry, in order.
pub fn dedup_preserving_order(list: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(list.len());
    list.into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
