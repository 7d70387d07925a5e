//! Pipeline context and tuning: shared state passed into the walk, dispatcher and file workers.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::utils::config::ConcurrencyLimits;
use crate::utils::fd_limit::cap_file_width;
use crate::{FileError, SummarizeOpts};

use super::filter::PathFilter;

/// Pool widths and channel capacity for one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineTuning {
    /// Max concurrently active category tasks.
    pub category_width: usize,
    /// Max concurrently open files.
    pub file_width: usize,
    /// Capacity of the emission channel; equals the file pool width.
    pub channel_cap: usize,
}

impl PipelineTuning {
    /// Resolve widths from opts: category → host parallelism unless set; file → requested (or
    /// default) capped by the FD limit.
    pub fn from_opts(opts: &SummarizeOpts) -> Self {
        let defaults = ConcurrencyLimits::current();
        let category_width = opts
            .category_width
            .unwrap_or(defaults.category_width)
            .max(1);
        let file_width = cap_file_width(opts.file_width.unwrap_or(defaults.file_width));
        Self {
            category_width,
            file_width,
            channel_cap: file_width,
        }
    }
}

/// Recoverable errors shared by the walk and every task.
pub type ErrorLog = Arc<Mutex<Vec<FileError>>>;

/// Per-run task outcome counters, written concurrently and read after the barrier.
#[derive(Debug, Default)]
pub struct Counters {
    pub candidates: AtomicUsize,
    pub emitted: AtomicUsize,
    pub failed: AtomicUsize,
    pub denied: AtomicUsize,
    pub dedup_skipped: AtomicUsize,
}

impl Counters {
    pub fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicUsize, n: usize) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::Acquire)
    }
}

/// Shared context for the walk: root, filter, walk flags and the error log.
pub struct PipelineContext {
    /// Canonical walk root.
    pub root: PathBuf,
    /// Canonical output directory when it lies under the root; pruned from the walk.
    pub output_canonical: Option<PathBuf>,
    pub filter: PathFilter,
    pub follow_links: bool,
    pub errors: ErrorLog,
}

impl PipelineContext {
    pub fn new(root: PathBuf, opts: &SummarizeOpts, output_canonical: Option<PathBuf>) -> Self {
        Self {
            root,
            output_canonical,
            filter: PathFilter::from_opts(opts),
            follow_links: opts.follow_links,
            errors: Arc::new(Mutex::new(Vec::new())),
        }
    }
}
