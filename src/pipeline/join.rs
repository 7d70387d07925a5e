//! Completion barrier for dynamically spawned tasks.
//!
//! A shared count of outstanding tasks: [`JoinGroup::add`] increments it when a task is spawned and
//! hands back a [`TaskGuard`] that decrements it when dropped. [`JoinGroup::wait`] blocks until the
//! count is zero. Tasks can spawn more tasks (category → file); the count covers all of them.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct JoinGroup {
    outstanding: Mutex<usize>,
    cv: Condvar,
}

impl JoinGroup {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock_or_recover(&self) -> MutexGuard<'_, usize> {
        self.outstanding.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Register one task. Call before spawning it, from the spawning thread.
    pub fn add(self: &Arc<Self>) -> TaskGuard {
        *self.lock_or_recover() += 1;
        TaskGuard {
            group: Arc::clone(self),
        }
    }

    /// Tasks registered and not yet finished.
    pub fn outstanding(&self) -> usize {
        *self.lock_or_recover()
    }

    /// Block until every registered task has finished.
    pub fn wait(&self) {
        let mut n = self.lock_or_recover();
        while *n > 0 {
            n = self.cv.wait(n).unwrap_or_else(|p| p.into_inner());
        }
    }

    fn done(&self) {
        let mut n = self.lock_or_recover();
        *n = n.saturating_sub(1);
        if *n == 0 {
            drop(n);
            self.cv.notify_all();
        }
    }
}

/// Marks one task as finished when dropped.
#[derive(Debug)]
#[must_use = "dropping the guard marks the task finished"]
pub struct TaskGuard {
    group: Arc<JoinGroup>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.group.done();
    }
}
