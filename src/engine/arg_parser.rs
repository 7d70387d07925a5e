use clap::Parser;
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Aggregate a source tree into one size-capped Markdown summary.
#[derive(Clone, Debug, Parser)]
#[command(name = "summarize", version)]
#[command(about = "Summarize a directory into a single Markdown file, grouped by extension.")]
pub struct Cli {
    /// Directory to summarize. Default: current directory.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Directory to write the summary to. Default: `summaries` in DIR.
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Summary filename. Default: summary.<UTC timestamp>.md
    #[arg(long, short = 'f')]
    pub filename: Option<String>,

    /// Extensions to include (comma separated). Replaces the default list.
    #[arg(long, short = 'i', value_delimiter = ',')]
    pub include: Vec<String>,

    /// Extensions to exclude (comma separated). Replaces the default list.
    #[arg(long, short = 'x', value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Path substrings that skip a file (comma separated). Replaces the default list.
    #[arg(long, short = 's', value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Include dotfiles and files under dot-directories.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub dotfiles: Option<bool>,

    /// Follow symbolic links.
    #[arg(long, short = 'L', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Max files processed concurrently.
    #[arg(long = "max-files", visible_alias = "mf")]
    pub max_files: Option<usize>,

    /// Max categories processed concurrently. Default: available parallelism.
    #[arg(long)]
    pub category_width: Option<usize>,

    /// Soft byte ceiling for the summary.
    #[arg(long = "max-output", visible_alias = "max")]
    pub max_output: Option<u64>,

    /// Print the summary to stdout.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub print: Option<bool>,

    /// Write the summary to disk (default when --print is not given).
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub write: Option<bool>,

    /// JSON output on stdout.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,

    /// Gzip the written summary (adds .gz).
    #[arg(long = "gz", num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub compress: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Trace-level logging (every filter decision).
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub debug: Option<bool>,

    /// Print the effective include/exclude/skip lists and exit.
    #[arg(long)]
    pub expand: bool,
}
