use log::{debug, warn};

use crate::FileError;

use super::context::ErrorLog;

/// Record one recoverable error. Never panics, even if another thread poisoned the log.
pub fn record_error(errors: &ErrorLog, err: FileError) {
    debug!("recoverable: {}", err);
    errors.lock().unwrap_or_else(|p| p.into_inner()).push(err);
}

/// Move the recorded errors out. Call after the completion barrier.
pub fn take_errors(errors: &ErrorLog) -> Vec<FileError> {
    std::mem::take(&mut *errors.lock().unwrap_or_else(|p| p.into_inner()))
}

/// Surface the recoverable batch once: a warning line, plus each error when verbose.
pub fn report_recoverable_errors(errors: &[FileError], verbose: bool) {
    if errors.is_empty() {
        return;
    }
    warn!(
        "{} file(s) could not be summarized (stat/read failures)",
        errors.len()
    );
    if verbose {
        for e in errors {
            eprintln!("  skipped: {}", e);
        }
    }
}
