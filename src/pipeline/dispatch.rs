//! Dispatcher: fans categories out under the category limiter and files out under the file limiter.
//!
//! Each category task owns one category slot for as long as it is scheduling its files, then gives
//! it back without waiting for those files. Every task, category or file, is counted by the shared
//! [`JoinGroup`]; [`Dispatcher::dispatch`] returns only after all of them finished.

use log::{debug, warn};
use std::sync::Arc;
use std::thread;

use crate::FileError;

use super::category::Bucket;
use super::context::{Counters, PipelineTuning};
use super::dedup::{DedupGate, dedup_bucket};
use super::error_handler::record_error;
use super::join::{JoinGroup, TaskGuard};
use super::limiter::{Limiter, Permit};
use super::worker::{FileJob, FileTask, WorkerContext};

/// Counts from one dispatch, read after the barrier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub categories: usize,
    pub candidates: usize,
    pub emitted: usize,
    pub failed: usize,
    pub denied: usize,
    pub dedup_skipped: usize,
    pub peak_category_tasks: usize,
    pub peak_file_tasks: usize,
}

/// Shared handles for one run. Cheap to clone into task threads.
#[derive(Clone)]
pub struct Dispatcher {
    category_limiter: Arc<Limiter>,
    file_limiter: Arc<Limiter>,
    gate: Arc<DedupGate>,
    join: Arc<JoinGroup>,
    worker: Arc<WorkerContext>,
}

impl Dispatcher {
    pub fn new(tuning: &PipelineTuning, gate: Arc<DedupGate>, worker: WorkerContext) -> Self {
        Self {
            category_limiter: Limiter::new("category", tuning.category_width),
            file_limiter: Limiter::new("file", tuning.file_width),
            gate,
            join: JoinGroup::new(),
            worker: Arc::new(worker),
        }
    }

    pub fn file_limiter(&self) -> &Arc<Limiter> {
        &self.file_limiter
    }

    pub fn category_limiter(&self) -> &Arc<Limiter> {
        &self.category_limiter
    }

    /// Dispatch every bucket and block until every spawned task finished.
    ///
    /// Consumes the dispatcher so its handle on the emission channel is gone when this returns;
    /// the channel closes as soon as the last file task drops its sender.
    pub fn dispatch(self, buckets: Vec<Bucket>) -> DispatchReport {
        let categories = buckets.len();
        debug!(
            "Dispatching {} categories (category width {}, file width {})",
            categories,
            self.category_limiter.width(),
            self.file_limiter.width()
        );

        for bucket in buckets {
            if bucket.paths.is_empty() {
                continue;
            }
            let permit = self.category_limiter.acquire();
            let guard = self.join.add();
            self.spawn_category(bucket, permit, guard);
        }

        self.join.wait();

        let c = &self.worker.counters;
        let report = DispatchReport {
            categories,
            candidates: Counters::get(&c.candidates),
            emitted: Counters::get(&c.emitted),
            failed: Counters::get(&c.failed),
            denied: Counters::get(&c.denied),
            dedup_skipped: Counters::get(&c.dedup_skipped),
            peak_category_tasks: self.category_limiter.peak(),
            peak_file_tasks: self.file_limiter.peak(),
        };
        debug!("Dispatch done: {:?}", report);
        report
    }

    fn spawn_category(&self, bucket: Bucket, permit: Permit, guard: TaskGuard) {
        let fallback = bucket.paths.clone();
        let category = bucket.category.clone();
        let this = self.clone();
        let spawned = thread::Builder::new()
            .name(format!("category-{category}"))
            .spawn(move || this.run_category(bucket, permit, guard));
        if let Err(e) = spawned {
            // The closure, its permit and its guard were dropped with the failed spawn.
            warn!("could not start category {:?}: {}", category, e);
            let c = &self.worker.counters;
            Counters::add(&c.candidates, fallback.len());
            Counters::add(&c.failed, fallback.len());
            for path in fallback {
                record_error(
                    &self.worker.errors,
                    FileError::Spawn {
                        path,
                        source: std::io::Error::new(e.kind(), e.to_string()),
                    },
                );
            }
        }
    }

    /// Category task: dedup the bucket, claim each path and spawn its file task.
    /// The category slot is released on return, once every child is scheduled.
    fn run_category(self, bucket: Bucket, permit: Permit, guard: TaskGuard) {
        let Bucket { category, paths } = bucket;
        let unique = dedup_bucket(paths);
        let c = Arc::clone(&self.worker.counters);
        Counters::add(&c.candidates, unique.len());

        let mut scheduled = 0usize;
        for (path, identity) in unique {
            if self.gate.contains(&identity) {
                Counters::bump(&c.dedup_skipped);
                continue;
            }
            let file_permit = self.file_limiter.acquire();
            if !self.gate.claim(&identity) {
                Counters::bump(&c.dedup_skipped);
                continue;
            }
            let task = FileTask {
                ctx: Arc::clone(&self.worker),
                job: FileJob {
                    category: category.clone(),
                    path: path.clone(),
                    identity,
                },
                permit: file_permit,
                guard: self.join.add(),
            };
            if let Err(source) = thread::Builder::new()
                .name("file".to_string())
                .spawn(move || task.run())
            {
                Counters::bump(&c.failed);
                record_error(&self.worker.errors, FileError::Spawn { path, source });
                continue;
            }
            scheduled += 1;
        }
        debug!("category {:?}: {} file task(s) scheduled", category, scheduled);
        drop(permit);
        drop(guard);
    }
}
