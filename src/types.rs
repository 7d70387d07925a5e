//! Public and internal types for the summarize API and pipeline.

use std::path::PathBuf;

use crate::utils::config::{DefaultLists, Limits};

/// One formatted file record on its way from a file worker to the aggregator.
///
/// `path` is the dedup identity (canonical path when it could be resolved). The worker gives up
/// the buffer when it sends the result; nothing else holds a reference to `content`.
#[derive(Debug)]
pub struct EmittedResult {
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub len: u64,
}

impl EmittedResult {
    pub fn new(path: PathBuf, content: Vec<u8>) -> Self {
        let len = content.len() as u64;
        Self { path, content, len }
    }
}

/// Recoverable, per-path failure. Collected during the run and reported once after the barrier.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("walk {}: {msg}", path.display())]
    Walk { path: PathBuf, msg: String },

    #[error("stat {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a regular file", path.display())]
    NotAFile { path: PathBuf },

    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata for {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("emit {}: aggregator hung up", path.display())]
    Emit { path: PathBuf },

    #[error("spawn task for {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    /// Path the error is about.
    pub fn path(&self) -> &std::path::Path {
        match self {
            FileError::Walk { path, .. }
            | FileError::Stat { path, .. }
            | FileError::NotAFile { path }
            | FileError::Emit { path }
            | FileError::Read { path, .. }
            | FileError::Metadata { path, .. }
            | FileError::Spawn { path, .. } => path,
        }
    }
}

/// Counters for one run, snapshotted after the completion barrier.
///
/// `emitted + failed + denied + dedup_skipped == candidates` holds for every completed run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Regular (non-directory) entries seen by the walk.
    pub discovered: usize,
    /// Entries that passed the path filter but whose category was not registered.
    pub unregistered: usize,
    /// Distinct paths across all buckets after in-bucket dedup.
    pub candidates: usize,
    /// Records sent to the aggregator.
    pub emitted: usize,
    /// Tasks that ended with a recoverable error.
    pub failed: usize,
    /// Paths skipped by the built-in artifact denylist.
    pub denied: usize,
    /// Paths skipped because another task already claimed them.
    pub dedup_skipped: usize,
    /// Records written into the aggregate.
    pub written: usize,
    /// Records discarded after the byte ceiling was reached.
    pub over_budget: usize,
    /// Records discarded by the aggregator as duplicates.
    pub duplicates: usize,
    /// Final value of the cumulative byte counter (preamble included).
    pub bytes_counted: u64,
    /// High-water mark of concurrently active category tasks.
    pub peak_category_tasks: usize,
    /// High-water mark of concurrently active file tasks.
    pub peak_file_tasks: usize,
}

/// Result of a completed run: the aggregate, the recoverable error batch and run counters.
#[derive(Debug, Default)]
pub struct Summary {
    pub aggregate: Vec<u8>,
    pub errors: Vec<FileError>,
    pub stats: RunStats,
}

/// Lib options for [`summarize_dir`](crate::summarize_dir). Only the pipeline knobs; no output handling.
#[derive(Clone, Debug)]
pub struct SummarizeOpts {
    /// Extensions (categories) to include. Each one is registered up front, even if nothing matches.
    pub include: Vec<String>,
    /// Extensions to reject, compared case-insensitively.
    pub exclude: Vec<String>,
    /// Substrings that reject a file when found in its name or root-relative path.
    pub skip: Vec<String>,
    /// Reject files whose name, or any parent directory under the root, starts with `.`.
    pub exclude_dotfiles: bool,
    /// Follow symbolic links during the walk.
    pub follow_links: bool,
    /// Max concurrently active category tasks. When None, host parallelism.
    pub category_width: Option<usize>,
    /// Max concurrently open files. When None, [`Limits::MAX_FILES`] capped by the FD limit.
    pub file_width: Option<usize>,
    /// Soft byte ceiling for the aggregate.
    pub max_output_size: u64,
    /// Bytes placed at the head of the aggregate and counted against the ceiling.
    pub preamble: Vec<u8>,
}

impl Default for SummarizeOpts {
    fn default() -> Self {
        Self {
            include: DefaultLists::include(),
            exclude: DefaultLists::exclude(),
            skip: DefaultLists::skip(),
            exclude_dotfiles: true,
            follow_links: false,
            category_width: None,
            file_width: None,
            max_output_size: Limits::MAX_OUTPUT_SIZE,
            preamble: Vec::new(),
        }
    }
}

impl From<&Opts> for SummarizeOpts {
    fn from(o: &Opts) -> Self {
        SummarizeOpts {
            include: o.include.clone(),
            exclude: o.exclude.clone(),
            skip: o.skip.clone(),
            exclude_dotfiles: !o.dotfiles,
            follow_links: o.follow_links,
            category_width: o.category_width,
            file_width: Some(o.max_files),
            max_output_size: o.max_output_size,
            preamble: Vec::new(),
        }
    }
}

/// Full options (CLI). Use [`SummarizeOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    pub source_dir: PathBuf,
    /// Directory the summary is written to. When None, `<source_dir>/summaries`.
    pub output_dir: Option<PathBuf>,
    /// Summary filename. When None, a timestamped `summary.<ts>.md`.
    pub filename: Option<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub skip: Vec<String>,
    /// Include dotfiles (and files under dot-directories).
    pub dotfiles: bool,
    pub follow_links: bool,
    pub category_width: Option<usize>,
    /// Max files processed concurrently.
    pub max_files: usize,
    /// Soft byte ceiling for the summary.
    pub max_output_size: u64,
    /// Print the summary to stdout.
    pub print: bool,
    /// Write the summary to disk (also the default when neither print nor write is set).
    pub write: bool,
    /// JSON envelope for stdout output.
    pub json: bool,
    /// Gzip the written/printed summary.
    pub compress: bool,
    pub verbose: bool,
    pub debug: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            output_dir: None,
            filename: None,
            include: DefaultLists::include(),
            exclude: DefaultLists::exclude(),
            skip: DefaultLists::skip(),
            dotfiles: false,
            follow_links: false,
            category_width: None,
            max_files: Limits::MAX_FILES,
            max_output_size: Limits::MAX_OUTPUT_SIZE,
            print: false,
            write: false,
            json: false,
            compress: false,
            verbose: false,
            debug: false,
        }
    }
}
