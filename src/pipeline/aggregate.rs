//! Aggregator: the single consumer of the emission channel.
//!
//! Items are written in arrival order until the cumulative byte counter reaches the ceiling. The item
//! that reaches it is still written whole (records are never truncated); from then on the aggregator
//! only drains, so producers never stall on a full channel.

use crossbeam_channel::Receiver;
use log::debug;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use crate::EmittedResult;

/// What happened to one item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acceptance {
    Written,
    OverBudget,
    Duplicate,
}

/// Counts kept by the aggregator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub written: usize,
    pub over_budget: usize,
    pub duplicates: usize,
}

/// Finalized aggregate, returned when the channel closes.
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    pub buffer: Vec<u8>,
    pub stats: AggregateStats,
    /// Final value of the cumulative counter.
    pub bytes_counted: u64,
}

pub struct Aggregator {
    ceiling: u64,
    counter: Arc<AtomicU64>,
    buffer: Vec<u8>,
    written: HashSet<PathBuf>,
    draining: bool,
    stats: AggregateStats,
    on_written: Option<Box<dyn Fn(usize) + Send>>,
}

impl Aggregator {
    pub fn new(ceiling: u64) -> Self {
        Self {
            ceiling,
            counter: Arc::new(AtomicU64::new(0)),
            buffer: Vec::new(),
            written: HashSet::new(),
            draining: false,
            stats: AggregateStats::default(),
            on_written: None,
        }
    }

    /// Seed the buffer (and the counter) with a header.
    pub fn with_preamble(mut self, preamble: Vec<u8>) -> Self {
        let post = self
            .counter
            .fetch_add(preamble.len() as u64, Ordering::AcqRel)
            + preamble.len() as u64;
        self.buffer = preamble;
        if post >= self.ceiling {
            debug!("preamble alone reaches the {} byte ceiling", self.ceiling);
            self.draining = true;
        }
        self
    }

    /// Callback invoked with 1 after each written item (progress reporting).
    pub fn with_progress(mut self, on_written: Option<Box<dyn Fn(usize) + Send>>) -> Self {
        self.on_written = on_written;
        self
    }

    /// Shared cumulative byte counter.
    pub fn counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.counter)
    }

    pub fn is_draining(&self) -> bool {
        self.draining
    }

    /// Handle one item.
    pub fn accept(&mut self, item: EmittedResult) -> Acceptance {
        if self.written.contains(&item.path) {
            self.stats.duplicates += 1;
            return Acceptance::Duplicate;
        }
        let post = self.counter.fetch_add(item.len, Ordering::AcqRel) + item.len;
        if self.draining {
            self.stats.over_budget += 1;
            return Acceptance::OverBudget;
        }
        self.buffer.extend_from_slice(&item.content);
        self.written.insert(item.path);
        self.stats.written += 1;
        if let Some(cb) = &self.on_written {
            cb(1);
        }
        if post >= self.ceiling {
            debug!(
                "byte ceiling {} reached at {}; draining remaining records",
                self.ceiling, post
            );
            self.draining = true;
        }
        Acceptance::Written
    }

    /// Drain `rx` until every sender is gone, then finalize.
    pub fn drain(mut self, rx: Receiver<EmittedResult>) -> AggregateOutcome {
        while let Ok(item) = rx.recv() {
            self.accept(item);
        }
        debug!(
            "aggregator: channel closed, {} written, {} over budget, {} duplicates",
            self.stats.written, self.stats.over_budget, self.stats.duplicates
        );
        self.finish()
    }

    /// Finalize without draining.
    pub fn finish(self) -> AggregateOutcome {
        AggregateOutcome {
            buffer: self.buffer,
            stats: self.stats,
            bytes_counted: self.counter.load(Ordering::Acquire),
        }
    }

    /// Run [`drain`](Self::drain) on its own thread.
    pub fn spawn(self, rx: Receiver<EmittedResult>) -> std::io::Result<JoinHandle<AggregateOutcome>> {
        thread::Builder::new()
            .name("aggregator".to_string())
            .spawn(move || self.drain(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(path: &str, len: usize) -> EmittedResult {
        EmittedResult::new(PathBuf::from(path), vec![b'x'; len])
    }

    #[test]
    fn test_accept_then_cap() {
        let mut agg = Aggregator::new(100);
        assert_eq!(agg.accept(item("a", 40)), Acceptance::Written);
        assert_eq!(agg.accept(item("b", 40)), Acceptance::Written);
        assert_eq!(agg.accept(item("c", 40)), Acceptance::Written);
        assert!(agg.is_draining());
        assert_eq!(agg.accept(item("d", 40)), Acceptance::OverBudget);
        assert_eq!(agg.accept(item("e", 1)), Acceptance::OverBudget);
        let out = agg.finish();
        assert_eq!(out.buffer.len(), 120);
        assert_eq!(out.stats.written, 3);
        assert_eq!(out.stats.over_budget, 2);
        assert_eq!(out.bytes_counted, 201);
    }

    #[test]
    fn test_exact_ceiling_stops_admission() {
        let mut agg = Aggregator::new(100);
        agg.accept(item("a", 50));
        agg.accept(item("b", 50));
        assert!(agg.is_draining());
        assert_eq!(agg.accept(item("c", 1)), Acceptance::OverBudget);
    }

    #[test]
    fn test_duplicate_discarded_and_not_counted() {
        let mut agg = Aggregator::new(1000);
        agg.accept(item("a", 10));
        assert_eq!(agg.accept(item("a", 10)), Acceptance::Duplicate);
        let out = agg.finish();
        assert_eq!(out.buffer.len(), 10);
        assert_eq!(out.bytes_counted, 10);
        assert_eq!(out.stats.duplicates, 1);
    }

    #[test]
    fn test_preamble_counts_against_ceiling() {
        let mut agg = Aggregator::new(100).with_preamble(vec![b'#'; 90]);
        assert!(!agg.is_draining());
        assert_eq!(agg.accept(item("a", 20)), Acceptance::Written);
        assert_eq!(agg.accept(item("b", 20)), Acceptance::OverBudget);
        let out = agg.finish();
        assert_eq!(out.buffer.len(), 110);
        assert!(out.buffer.starts_with(&[b'#'; 90]));
    }
}
