//! Pipeline components: filter, category index, dedup gate, limiters, walk, dispatch, workers, aggregator.

pub mod aggregate;
pub mod category;
pub mod context;
pub mod dedup;
pub mod dispatch;
pub mod error_handler;
pub mod filter;
pub mod join;
pub mod limiter;
pub mod orchestrator;
pub mod walk;
pub mod worker;

pub use aggregate::{Acceptance, AggregateOutcome, AggregateStats, Aggregator};
pub use category::{Bucket, CategoryIndex};
pub use context::{Counters, ErrorLog, PipelineContext, PipelineTuning};
pub use dedup::{DedupGate, dedup_bucket, identity_of};
pub use dispatch::{DispatchReport, Dispatcher};
pub use error_handler::{record_error, report_recoverable_errors, take_errors};
pub use filter::{Admission, PathFilter, category_of, normalize_category};
pub use join::{JoinGroup, TaskGuard};
pub use limiter::{Limiter, Permit};
pub use orchestrator::{PipelineHooks, run_pipeline, run_pipeline_with, setup_pipeline_root};
pub use walk::{WalkOutcome, WalkReport, run_walk_loop, to_outcome_walkdir, walk};
pub use worker::{FileJob, FileTask, WorkerContext, fence_for, format_record, is_denied_artifact};
