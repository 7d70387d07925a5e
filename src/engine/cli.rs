//! CLI command handler: layer config, run the pipeline, hand the aggregate to the sink.

use anyhow::{Result, bail};
use log::{debug, info};

use crate::engine::arg_parser::Cli;
use crate::engine::progress::{finish_progress_bar, progress_callback};
use crate::engine::sink::{self, OutputTarget};
use crate::engine::tools::dedup_preserving_order;
use crate::pipeline::{PipelineHooks, report_recoverable_errors, run_pipeline_with};
use crate::utils::config::Limits;
use crate::utils::summarize_toml::{apply_file_to_opts, load_summarize_toml};
use crate::utils::{apply_env_to_opts, load_dotenv, setup_logging};
use crate::{Opts, SummarizeOpts};

/// Overwrite opts field from CLI when the flag was given.
macro_rules! apply_cli_opt {
    ($cli:expr, $opts:expr, $field:ident) => {
        if let Some(v) = $cli.$field {
            $opts.$field = v;
        }
    };
}

/// Non-empty CLI list replaces the configured one.
fn replace_if_given(target: &mut Vec<String>, given: &[String]) {
    let given: Vec<String> = given
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if !given.is_empty() {
        *target = given;
    }
}

fn apply_cli_to_opts(cli: &Cli, opts: &mut Opts) {
    opts.source_dir = cli.dir.clone();
    if cli.output_dir.is_some() {
        opts.output_dir = cli.output_dir.clone();
    }
    if cli.filename.is_some() {
        opts.filename = cli.filename.clone();
    }
    if cli.category_width.is_some() {
        opts.category_width = cli.category_width;
    }
    replace_if_given(&mut opts.include, &cli.include);
    replace_if_given(&mut opts.exclude, &cli.exclude);
    replace_if_given(&mut opts.skip, &cli.skip);
    apply_cli_opt!(cli, opts, dotfiles);
    apply_cli_opt!(cli, opts, follow_links);
    apply_cli_opt!(cli, opts, max_files);
    apply_cli_opt!(cli, opts, print);
    apply_cli_opt!(cli, opts, write);
    apply_cli_opt!(cli, opts, json);
    apply_cli_opt!(cli, opts, compress);
    apply_cli_opt!(cli, opts, verbose);
    apply_cli_opt!(cli, opts, debug);
    if let Some(v) = cli.max_output {
        opts.max_output_size = v;
    }
}

/// Range checks for the numeric knobs.
pub fn validate_opts(opts: &Opts) -> Result<()> {
    let (lo, hi) = Limits::MAX_FILES_RANGE;
    if !(lo..=hi).contains(&opts.max_files) {
        bail!("--max-files must be in {}..={}, got {}", lo, hi, opts.max_files);
    }
    let (lo, hi) = Limits::MAX_OUTPUT_RANGE;
    if !(lo..=hi).contains(&opts.max_output_size) {
        bail!(
            "--max-output must be in {}..={}, got {}",
            lo,
            hi,
            opts.max_output_size
        );
    }
    if opts.category_width == Some(0) {
        bail!("--category-width must be at least 1");
    }
    Ok(())
}

/// Defaults → config file → CLI → env additions, then dedup and validate.
pub fn setup_opts(cli: &Cli) -> Result<Opts> {
    // Log level comes from the CLI alone; the logger is up before the config file is read.
    setup_logging(cli.verbose.unwrap_or(false), cli.debug.unwrap_or(false));
    let mut opts = Opts::default();
    load_dotenv(&cli.dir);
    if let Some(file) = load_summarize_toml(&cli.dir) {
        apply_file_to_opts(&file, &mut opts);
    }
    apply_cli_to_opts(cli, &mut opts);
    apply_env_to_opts(&mut opts);
    opts.include = dedup_preserving_order(std::mem::take(&mut opts.include));
    opts.exclude = dedup_preserving_order(std::mem::take(&mut opts.exclude));
    opts.skip = dedup_preserving_order(std::mem::take(&mut opts.skip));
    validate_opts(&opts)?;
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    Ok(opts)
}

fn print_expanded(opts: &Opts) {
    println!("include: {}", opts.include.join(", "));
    println!("exclude: {}", opts.exclude.join(", "));
    println!("skip: {}", opts.skip.join(", "));
}

/// Summarize `cli.dir`: write and/or print the report, then report the recoverable errors.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli)?;
    if cli.expand {
        print_expanded(&opts);
        return Ok(());
    }

    let target = OutputTarget::resolve(&opts);
    let writing = sink::should_write(&opts);
    if writing {
        sink::check_output_available(&target)?;
        sink::prepare_output_dir(&target)?;
    }

    let mut lib_opts = SummarizeOpts::from(&opts);
    lib_opts.preamble = sink::render_header(&target.filename, &opts.source_dir);

    let (bar, on_written) = progress_callback(opts.verbose && !opts.print);
    let hooks = PipelineHooks {
        output_dir: Some(target.dir.clone()),
        on_written,
    };
    debug!("Summarizing {}...", opts.source_dir.display());
    let summary = run_pipeline_with(&opts.source_dir, &lib_opts, hooks)?;
    if let Some(bar) = bar {
        finish_progress_bar(&bar);
    }

    let stats = &summary.stats;
    info!(
        "{} file(s) written, {} over budget, {} bytes",
        stats.written,
        stats.over_budget,
        summary.aggregate.len()
    );
    debug!("Run stats: {:?}", stats);
    report_recoverable_errors(&summary.errors, opts.verbose);

    sink::deliver(&opts, &target, &summary.aggregate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_lists_replace_defaults() {
        let cli = Cli::parse_from(["summarize", "/src", "-i", "rs,toml", "--mf", "8"]);
        let mut opts = Opts::default();
        apply_cli_to_opts(&cli, &mut opts);
        assert_eq!(opts.include, vec!["rs", "toml"]);
        assert_eq!(opts.max_files, 8);
        assert_eq!(opts.skip, Opts::default().skip);
    }

    #[test]
    fn test_cli_flag_forms() {
        let cli = Cli::parse_from(["summarize", "--print", "--json=false", "--gz"]);
        let mut opts = Opts {
            json: true,
            ..Opts::default()
        };
        apply_cli_to_opts(&cli, &mut opts);
        assert!(opts.print);
        assert!(!opts.json);
        assert!(opts.compress);
        assert!(!opts.write);
    }

    #[test]
    fn test_validate_ranges() {
        let mut opts = Opts::default();
        assert!(validate_opts(&opts).is_ok());
        opts.max_files = 0;
        assert!(validate_opts(&opts).is_err());
        opts.max_files = 4;
        opts.max_output_size = 10;
        assert!(validate_opts(&opts).is_err());
        opts.max_output_size = 369;
        assert!(validate_opts(&opts).is_ok());
    }
}
