//! Where the aggregate goes: header, optional gzip, file on disk, stdout.

use anyhow::{Context, Result, bail};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::{debug, info};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::utils::config::PackagePaths;

const INSTRUCTIONS: &str = "AI Instructions are the user requests that you analyze their project \
workspace as provided here by filename followed by the contents. Answer their question using the \
source code provided as the basis of your responses. When asked to modify a file, provide the \
completely updated form of the file without abbreviating it, retaining all existing functionality \
and comments.";

/// JSON envelope for `--print --json`.
#[derive(Debug, Serialize)]
struct Final<'a> {
    path: String,
    size: usize,
    contents: &'a str,
}

/// JSON envelope for the completion message.
#[derive(Debug, Serialize)]
struct Message {
    message: String,
}

/// Resolved output destination for one run.
#[derive(Clone, Debug)]
pub struct OutputTarget {
    pub dir: PathBuf,
    /// Full path of the file that will be written (`.gz` already appended when compressing).
    pub path: PathBuf,
    /// Plain filename used in the header title.
    pub filename: String,
}

impl OutputTarget {
    /// `<output_dir>/<filename>`, defaulting to `<source_dir>/summaries/summary.<ts>.md`.
    pub fn resolve(opts: &Opts) -> Self {
        let paths = PackagePaths::get();
        let dir = opts
            .output_dir
            .clone()
            .unwrap_or_else(|| opts.source_dir.join(paths.output_dir_name()));
        let filename = opts
            .filename
            .clone()
            .unwrap_or_else(|| paths.summary_filename());
        let mut path = dir.join(&filename);
        if opts.compress {
            let mut s = path.into_os_string();
            s.push(".gz");
            path = PathBuf::from(s);
        }
        Self {
            dir,
            path,
            filename,
        }
    }
}

/// Whether this run writes to disk: `--write`, or neither `--write` nor `--print`.
pub fn should_write(opts: &Opts) -> bool {
    opts.write || !opts.print
}

/// Refuse to clobber an earlier summary.
pub fn check_output_available(target: &OutputTarget) -> Result<()> {
    if target.path.exists() {
        bail!(
            "output file {} already exists; pick another --filename or remove it",
            target.path.display()
        );
    }
    Ok(())
}

/// Create the output directory (and parents).
pub fn prepare_output_dir(target: &OutputTarget) -> Result<()> {
    std::fs::create_dir_all(&target.dir)
        .with_context(|| format!("create output dir {}", target.dir.display()))
}

/// Header placed at the head of the aggregate: title, generator, instructions, workspace path.
pub fn render_header(filename: &str, workspace: &Path) -> Vec<u8> {
    let name = Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    let workspace = std::path::absolute(workspace).unwrap_or_else(|_| workspace.to_path_buf());
    format!(
        "# Project Summary - {}\nGenerated by {} {}\n\n{}\n\n### Workspace\n\n`{}`\n\n",
        name,
        PackagePaths::get().pkg_name(),
        env!("CARGO_PKG_VERSION"),
        INSTRUCTIONS,
        workspace.display()
    )
    .into_bytes()
}

/// Gzip `bytes` at the default level.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).context("gzip write")?;
    encoder.finish().context("gzip finish")
}

/// Inverse of [`compress`].
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut out)
        .context("gzip read")?;
    Ok(out)
}

/// Write the (optionally compressed) aggregate. Fails if the file appeared since the check.
pub fn write_summary(target: &OutputTarget, aggregate: &[u8], gz: bool) -> Result<u64> {
    prepare_output_dir(target)?;
    let bytes = if gz {
        compress(aggregate)?
    } else {
        aggregate.to_vec()
    };
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target.path)
        .with_context(|| format!("create {}", target.path.display()))?;
    file.write_all(&bytes)
        .with_context(|| format!("write {}", target.path.display()))?;
    debug!("Wrote {} bytes to {}", bytes.len(), target.path.display());
    Ok(bytes.len() as u64)
}

/// Print the report to stdout, plain or in the JSON envelope. Always uncompressed.
pub fn print_summary(target: &OutputTarget, aggregate: &[u8], json: bool) -> Result<()> {
    let mut out = std::io::stdout().lock();
    if json {
        let contents = String::from_utf8_lossy(aggregate);
        let env = Final {
            path: target.path.display().to_string(),
            size: aggregate.len(),
            contents: &contents,
        };
        let s = serde_json::to_string_pretty(&env).context("serialize summary")?;
        writeln!(out, "{}", s)?;
    } else {
        // Raw bytes, so stdout matches the written file byte for byte.
        out.write_all(aggregate)?;
        out.flush()?;
    }
    Ok(())
}

/// "Summary generated: PATH", plain or as `{"message": ...}`.
pub fn completion_message(target: &OutputTarget, json: bool) -> Result<String> {
    let message = format!("Summary generated: {}", target.path.display());
    if json {
        return serde_json::to_string_pretty(&Message { message }).context("serialize message");
    }
    Ok(message)
}

/// Write and/or print per opts. The completion line goes to stdout unless the report itself did.
pub fn deliver(opts: &Opts, target: &OutputTarget, aggregate: &[u8]) -> Result<()> {
    if should_write(opts) {
        write_summary(target, aggregate, opts.compress)?;
    }
    if opts.print {
        print_summary(target, aggregate, opts.json)?;
        if should_write(opts) {
            info!("Summary generated: {}", target.path.display());
        }
        return Ok(());
    }
    println!("{}", completion_message(target, opts.json)?);
    Ok(())
}
