use anyhow::{Context, Result, anyhow};
use crossbeam_channel::bounded;
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::engine::tools::check_readable_dir_and_canonicalize;
use crate::{EmittedResult, RunStats, Summary, SummarizeOpts};

use super::aggregate::Aggregator;
use super::category::CategoryIndex;
use super::context::{Counters, PipelineContext, PipelineTuning};
use super::dedup::DedupGate;
use super::dispatch::Dispatcher;
use super::error_handler::take_errors;
use super::walk::walk;
use super::worker::WorkerContext;

/// Extra wiring the CLI needs and lib callers usually do not.
#[derive(Default)]
pub struct PipelineHooks {
    /// Directory pruned from the walk (where the summary will be written).
    pub output_dir: Option<PathBuf>,
    /// Called with 1 for every record written into the aggregate.
    pub on_written: Option<Box<dyn Fn(usize) + Send>>,
}

/// Canonicalize the root and resolve the output dir when it lies under it.
pub fn setup_pipeline_root(
    root: &Path,
    output_dir: Option<&Path>,
) -> Result<(PathBuf, Option<PathBuf>)> {
    let root = check_readable_dir_and_canonicalize(root)?;
    let output_canonical = output_dir
        .and_then(|p| p.canonicalize().ok())
        .filter(|p| p.starts_with(&root) && p != &root);
    Ok((root, output_canonical))
}

/// Run the whole pipeline with default hooks.
pub fn run_pipeline(root: &Path, opts: &SummarizeOpts) -> Result<Summary> {
    run_pipeline_with(root, opts, PipelineHooks::default())
}

/// Main orchestrator: walk → category index → dispatcher → file workers → aggregator.
///
/// The walk finishes before any task is spawned, so a fatal walk error returns with nothing in
/// flight. After the barrier the emission channel closes and the aggregator finalizes.
pub fn run_pipeline_with(root: &Path, opts: &SummarizeOpts, hooks: PipelineHooks) -> Result<Summary> {
    let (root, output_canonical) = setup_pipeline_root(root, hooks.output_dir.as_deref())?;
    let tuning = PipelineTuning::from_opts(opts);
    debug!("Pipeline tuning: {:?}", tuning);

    let index = CategoryIndex::with_categories(&opts.include);
    let ctx = PipelineContext::new(root.clone(), opts, output_canonical);
    let walk_report = walk(&ctx, &index)?;
    let buckets = index.take_buckets();

    let (emit_tx, emit_rx) = bounded::<EmittedResult>(tuning.channel_cap);
    let aggregator = Aggregator::new(opts.max_output_size)
        .with_preamble(opts.preamble.clone())
        .with_progress(hooks.on_written);
    let aggregator_handle = aggregator.spawn(emit_rx).context("start aggregator thread")?;

    let counters = Arc::new(Counters::default());
    let dispatcher = Dispatcher::new(
        &tuning,
        Arc::new(DedupGate::new()),
        WorkerContext {
            root,
            emit_tx,
            errors: Arc::clone(&ctx.errors),
            counters,
        },
    );
    // Consumes the dispatcher; our sender is gone once this returns.
    let dispatch_report = dispatcher.dispatch(buckets);

    let outcome = aggregator_handle
        .join()
        .map_err(|_| anyhow!("aggregator thread panicked"))?;

    let stats = RunStats {
        discovered: walk_report.discovered,
        unregistered: walk_report.unregistered,
        candidates: dispatch_report.candidates,
        emitted: dispatch_report.emitted,
        failed: dispatch_report.failed,
        denied: dispatch_report.denied,
        dedup_skipped: dispatch_report.dedup_skipped,
        written: outcome.stats.written,
        over_budget: outcome.stats.over_budget,
        duplicates: outcome.stats.duplicates,
        bytes_counted: outcome.bytes_counted,
        peak_category_tasks: dispatch_report.peak_category_tasks,
        peak_file_tasks: dispatch_report.peak_file_tasks,
    };
    debug!("Run stats: {:?}", stats);

    Ok(Summary {
        aggregate: outcome.buffer,
        errors: take_errors(&ctx.errors),
        stats,
    })
}
