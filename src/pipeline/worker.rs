//! File worker: reads one file, formats its record and sends it to the aggregator.

use crossbeam_channel::Sender;
use log::trace;
use serde::Serialize;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::engine::tools::{path_relative_to, path_to_slash_string};
use crate::{EmittedResult, FileError};

use super::context::{Counters, ErrorLog};
use super::error_handler::record_error;
use super::join::TaskGuard;
use super::limiter::Permit;

/// File names that are never content, regardless of configuration.
const DENIED_NAMES: &[&str] = &[
    // macOS
    ".DS_Store",
    ".AppleDouble",
    ".LSOverride",
    // Windows
    "Thumbs.db",
    "ehthumbs.db",
    "desktop.ini",
    "Desktop.ini",
];

/// Path suffixes of compiled executables.
const DENIED_SUFFIXES: &[&str] = &[".exe", "-amd64", "-arm64", "aarch64"];

/// Built-in denylist of OS metadata files and compiled binaries.
pub fn is_denied_artifact(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    // macOS resource fork files start with ._
    if DENIED_NAMES.contains(&name) || name.starts_with("._") {
        return true;
    }
    let lower = name.to_ascii_lowercase();
    DENIED_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// Everything a file task needs besides its own path.
pub struct WorkerContext {
    pub root: PathBuf,
    pub emit_tx: Sender<EmittedResult>,
    pub errors: ErrorLog,
    pub counters: Arc<Counters>,
}

/// One scheduled file.
#[derive(Clone, Debug)]
pub struct FileJob {
    pub category: String,
    pub path: PathBuf,
    /// Dedup identity; becomes [`EmittedResult::path`].
    pub identity: PathBuf,
}

/// Metadata block embedded in each record.
#[derive(Debug, Serialize)]
struct FileInfo<'a> {
    name: &'a str,
    path: &'a str,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
}

#[cfg(unix)]
fn mode_string(meta: &Metadata) -> Option<String> {
    use std::os::unix::fs::PermissionsExt;
    Some(format!("{:04o}", meta.permissions().mode() & 0o7777))
}

#[cfg(not(unix))]
fn mode_string(meta: &Metadata) -> Option<String> {
    Some(if meta.permissions().readonly() { "readonly" } else { "writable" }.to_string())
}

fn modified_string(meta: &Metadata) -> Option<String> {
    let t = meta.modified().ok()?;
    Some(chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
}

/// Code fence long enough that no backtick run inside `content` can close it.
pub fn fence_for(content: &[u8]) -> String {
    let mut longest = 0usize;
    let mut run = 0usize;
    for &b in content {
        if b == b'`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat(longest.max(2) + 1)
}

/// Build the Markdown record for one file: heading, JSON metadata block, fenced content.
pub fn format_record(
    rel: &str,
    category: &str,
    meta: &Metadata,
    content: &[u8],
) -> Result<Vec<u8>, serde_json::Error> {
    let name = rel.rsplit('/').next().unwrap_or(rel);
    let info = FileInfo {
        name,
        path: rel,
        size: meta.len(),
        mode: mode_string(meta),
        modified: modified_string(meta),
    };
    let info_json = serde_json::to_string_pretty(&info)?;
    let fence = fence_for(content);

    let mut out = Vec::with_capacity(content.len() + info_json.len() + rel.len() * 2 + 96);
    out.extend_from_slice(format!("## {name}\n\n").as_bytes());
    out.extend_from_slice(format!("Metadata for `{rel}`:\n\n").as_bytes());
    out.extend_from_slice(format!("```json\n{info_json}\n```\n\n").as_bytes());
    out.extend_from_slice(format!("Source:\n\n{fence}{category}\n").as_bytes());
    out.extend_from_slice(content);
    if !content.ends_with(b"\n") {
        out.push(b'\n');
    }
    out.extend_from_slice(format!("{fence}\n\n").as_bytes());
    Ok(out)
}

/// Process one file: `Ok(None)` when denied, `Err` on stat/read failure.
pub fn process(root: &Path, job: &FileJob) -> Result<Option<EmittedResult>, FileError> {
    if is_denied_artifact(&job.path) {
        trace!("{}: denied artifact", job.path.display());
        return Ok(None);
    }
    let meta = std::fs::metadata(&job.path).map_err(|source| FileError::Stat {
        path: job.path.clone(),
        source,
    })?;
    if !meta.is_file() {
        return Err(FileError::NotAFile {
            path: job.path.clone(),
        });
    }
    let content = std::fs::read(&job.path).map_err(|source| FileError::Read {
        path: job.path.clone(),
        source,
    })?;
    let rel = path_relative_to(&job.path, root).unwrap_or_else(|| job.path.clone());
    let rel = path_to_slash_string(&rel);
    let record =
        format_record(&rel, &job.category, &meta, &content).map_err(|source| FileError::Metadata {
            path: job.path.clone(),
            source,
        })?;
    Ok(Some(EmittedResult::new(job.identity.clone(), record)))
}

/// A spawned file task. Field order is drop order: the sender goes first, then the file slot,
/// then the barrier guard, so the barrier only opens once the slot is free.
pub struct FileTask {
    pub ctx: Arc<WorkerContext>,
    pub job: FileJob,
    pub permit: Permit,
    pub guard: TaskGuard,
}

impl FileTask {
    /// Run to completion. Releases the file slot and signals the barrier exactly once on every path.
    pub fn run(self) {
        let FileTask {
            ctx,
            job,
            permit,
            guard,
        } = self;
        let counters = &ctx.counters;
        match process(&ctx.root, &job) {
            Ok(Some(result)) => {
                if ctx.emit_tx.send(result).is_ok() {
                    Counters::bump(&counters.emitted);
                } else {
                    Counters::bump(&counters.failed);
                    record_error(&ctx.errors, FileError::Emit { path: job.path });
                }
            }
            Ok(None) => Counters::bump(&counters.denied),
            Err(e) => {
                Counters::bump(&counters.failed);
                record_error(&ctx.errors, e);
            }
        }
        drop(ctx);
        drop(permit);
        drop(guard);
    }
}
