//! Summarize: aggregate a source tree into one size-capped Markdown report, grouped by extension

pub mod engine;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;
use std::path::Path;

/// Result alias used by public summarize API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: summarize `root` with `opts` and return the aggregate, the recoverable
/// error batch and the run counters.
///
/// Nothing is written to disk; the caller decides what to do with [`Summary::aggregate`].
/// A traversal failure (unreadable root, walk error at the root) returns `Err` with no aggregate.
///
/// ```ignore
/// let opts = summarize::SummarizeOpts { include: vec!["rs".into()], ..Default::default() };
/// let summary = summarize::summarize_dir(Path::new("."), &opts)?;
/// assert!(summary.errors.is_empty());
/// ```
pub fn summarize_dir(root: &Path, opts: &SummarizeOpts) -> Result<Summary> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    pipeline::run_pipeline(root, opts)
}
