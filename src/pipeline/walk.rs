//! Single-threaded walk: filters every non-directory entry and files admitted paths into the index.

use anyhow::{Result, anyhow};
use log::{debug, trace};
use std::path::{Path, PathBuf};

use crate::FileError;
use crate::engine::tools::{path_relative_to, path_to_slash_string};

use super::category::CategoryIndex;
use super::context::PipelineContext;
use super::error_handler::record_error;
use super::filter::Admission;

/// One result from a directory walk: an entry to consider or an error.
pub enum WalkOutcome {
    Ok {
        path: PathBuf,
        is_dir: bool,
    },
    /// `fatal` errors stop the walk (root or a directory could not be read).
    Err {
        msg: String,
        path: Option<PathBuf>,
        fatal: bool,
    },
}

/// Counts from one walk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Non-directory entries seen.
    pub discovered: usize,
    /// Entries that passed the filter.
    pub admitted: usize,
    /// Admitted entries filed under a registered category.
    pub indexed: usize,
    /// Admitted entries whose category is not registered (dropped).
    pub unregistered: usize,
    /// Per-entry errors recorded and skipped.
    pub entry_errors: usize,
}

/// A walkdir error is fatal when it is about the root or about a directory we could not read.
/// Loops and broken entries are recoverable.
fn is_fatal(err: &walkdir::Error) -> bool {
    if err.loop_ancestor().is_some() {
        return false;
    }
    if err.depth() == 0 {
        return true;
    }
    err.path().is_some_and(|p| p.is_dir())
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => {
            let is_dir = entry.file_type().is_dir();
            WalkOutcome::Ok {
                path: entry.into_path(),
                is_dir,
            }
        }
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
            fatal: is_fatal(&err),
        },
    }
}

fn walkdir_iter(ctx: &PipelineContext) -> impl Iterator<Item = WalkOutcome> + '_ {
    walkdir::WalkDir::new(&ctx.root)
        .follow_links(ctx.follow_links)
        .into_iter()
        .filter_entry(move |e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            if let Some(out) = &ctx.output_canonical
                && e.path() == out.as_path()
            {
                trace!("pruning output dir {}", e.path().display());
                return false;
            }
            let name = e.file_name().to_string_lossy();
            !ctx.filter.prunes_dir(&name)
        })
        .map(to_outcome_walkdir)
}

/// Walk `ctx.root` once and fill `index`. Returns the first fatal traversal error.
pub fn walk(ctx: &PipelineContext, index: &CategoryIndex) -> Result<WalkReport> {
    debug!("Walking {}", ctx.root.display());
    let report = run_walk_loop(ctx, index, walkdir_iter(ctx))?;
    debug!(
        "Walk done: {} discovered, {} admitted, {} indexed, {} unregistered, {} entry errors",
        report.discovered, report.admitted, report.indexed, report.unregistered, report.entry_errors
    );
    Ok(report)
}

/// Classify one non-directory path and file it under its category when admitted.
fn classify(ctx: &PipelineContext, index: &CategoryIndex, path: PathBuf, report: &mut WalkReport) {
    report.discovered += 1;
    let filename = match path.file_name() {
        Some(n) => n.to_string_lossy().into_owned(),
        None => return,
    };
    let rel = path_relative_to(&path, &ctx.root).unwrap_or_else(|| path.clone());
    let rel = path_to_slash_string(&rel);

    match ctx.filter.admit(&rel, &filename) {
        Admission::Admit(category) => {
            report.admitted += 1;
            if index.insert(&category, path) {
                report.indexed += 1;
            } else {
                report.unregistered += 1;
                trace!("{}: category {:?} not included", rel, category);
            }
        }
        rejected => trace!("{}: {}", rel, rejected),
    }
}

/// Run the walk loop over any iterator of [`WalkOutcome`]: classify files, record recoverable
/// errors, stop on the first fatal one.
pub fn run_walk_loop<I>(ctx: &PipelineContext, index: &CategoryIndex, iter: I) -> Result<WalkReport>
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut report = WalkReport::default();
    for outcome in iter {
        match outcome {
            WalkOutcome::Ok { is_dir: true, .. } => {}
            WalkOutcome::Ok { path, is_dir: false } => classify(ctx, index, path, &mut report),
            WalkOutcome::Err { msg, path, fatal } => {
                if fatal {
                    let at = path.as_deref().unwrap_or(Path::new("<unknown>"));
                    return Err(anyhow!("{}", msg).context(format!("walk {}", at.display())));
                }
                report.entry_errors += 1;
                record_error(
                    &ctx.errors,
                    FileError::Walk {
                        path: path.unwrap_or_else(|| ctx.root.clone()),
                        msg,
                    },
                );
            }
        }
    }
    Ok(report)
}
