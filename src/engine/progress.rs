//! Progress counter shown in verbose mode while records are written.

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

/// Create a counter for unknown total (shows count without percentage)
pub fn create_counter(desc: &'static str) -> Arc<Mutex<Bar>> {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " files"
    )))
}

/// Update progress bar if available.
/// Uses try_lock to avoid blocking the aggregator if the mutex is contended.
pub fn update_progress_bar(pb: &Arc<Mutex<Bar>>, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Final refresh and newline so following log lines start clean.
pub fn finish_progress_bar(pb: &Arc<Mutex<Bar>>) {
    if let Ok(mut pb) = pb.lock() {
        let _ = pb.refresh();
        eprintln!();
    }
}

/// Counter plus the callback the aggregator calls per written record.
pub fn progress_callback(
    verbose: bool,
) -> (Option<Arc<Mutex<Bar>>>, Option<Box<dyn Fn(usize) + Send>>) {
    if !verbose {
        return (None, None);
    }
    let bar = create_counter("Summarizing");
    let cb_bar = Arc::clone(&bar);
    let cb = Box::new(move |n: usize| update_progress_bar(&cb_bar, n)) as Box<dyn Fn(usize) + Send>;
    (Some(bar), Some(cb))
}
