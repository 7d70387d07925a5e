//! Blocking counting limiter with RAII permits.
//!
//! Two independent instances bound the pipeline: the category pool (how many categories are being
//! fanned out) and the file pool (how many files are open). Each permit is released exactly once,
//! on drop, whatever path the holder exits through.
//!
//! The limiter also records the high-water mark of permits in use so runs can report (and tests
//! can check) the observed concurrency.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

#[derive(Debug)]
struct State {
    in_use: usize,
    peak: usize,
}

/// Fixed-width counting semaphore. Share via `Arc<Limiter>`.
#[derive(Debug)]
pub struct Limiter {
    name: &'static str,
    width: usize,
    state: Mutex<State>,
    cv: Condvar,
}

impl Limiter {
    /// Create a limiter of `width` permits. A width of 0 is raised to 1 (0 would deadlock).
    pub fn new(name: &'static str, width: usize) -> Arc<Self> {
        Arc::new(Self {
            name,
            width: width.max(1),
            state: Mutex::new(State { in_use: 0, peak: 0 }),
            cv: Condvar::new(),
        })
    }

    /// Poison-tolerant lock; used on release paths that must not panic.
    fn lock_or_recover(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Permits currently held. Snapshot; may be stale when used.
    pub fn in_use(&self) -> usize {
        self.lock_or_recover().in_use
    }

    /// Most permits ever held at the same time.
    pub fn peak(&self) -> usize {
        self.lock_or_recover().peak
    }

    /// Take one permit, blocking while the limiter is exhausted.
    pub fn acquire(self: &Arc<Self>) -> Permit {
        let mut st = self.lock_or_recover();
        while st.in_use >= self.width {
            st = self.cv.wait(st).unwrap_or_else(|p| p.into_inner());
        }
        st.in_use += 1;
        st.peak = st.peak.max(st.in_use);
        Permit {
            limiter: Arc::clone(self),
        }
    }

    /// Take one permit if one is free.
    pub fn try_acquire(self: &Arc<Self>) -> Option<Permit> {
        let mut st = self.lock_or_recover();
        if st.in_use >= self.width {
            return None;
        }
        st.in_use += 1;
        st.peak = st.peak.max(st.in_use);
        Some(Permit {
            limiter: Arc::clone(self),
        })
    }

    fn release(&self) {
        let mut st = self.lock_or_recover();
        debug_assert!(st.in_use > 0, "{} limiter over-release", self.name);
        st.in_use = st.in_use.saturating_sub(1);
        drop(st);
        self.cv.notify_one();
    }
}

/// One slot of a [`Limiter`]; released on drop.
#[derive(Debug)]
#[must_use = "the permit is released as soon as it is dropped"]
pub struct Permit {
    limiter: Arc<Limiter>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.limiter.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_acquire_release_counts() {
        let l = Limiter::new("test", 2);
        let a = l.acquire();
        let b = l.acquire();
        assert_eq!(l.in_use(), 2);
        assert!(l.try_acquire().is_none());
        drop(a);
        assert_eq!(l.in_use(), 1);
        drop(b);
        assert_eq!(l.in_use(), 0);
        assert_eq!(l.peak(), 2);
    }

    #[test]
    fn test_zero_width_is_raised() {
        let l = Limiter::new("test", 0);
        assert_eq!(l.width(), 1);
        let _p = l.acquire();
    }

    #[test]
    fn test_acquire_blocks_until_release() {
        let l = Limiter::new("test", 1);
        let held = l.acquire();
        let acquired = Arc::new(AtomicBool::new(false));

        let handle = {
            let l = Arc::clone(&l);
            let acquired = Arc::clone(&acquired);
            thread::spawn(move || {
                let _p = l.acquire();
                acquired.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!acquired.load(Ordering::SeqCst));
        drop(held);
        handle.join().unwrap();
        assert!(acquired.load(Ordering::SeqCst));
        assert_eq!(l.in_use(), 0);
    }

    #[test]
    fn test_peak_never_exceeds_width() {
        let l = Limiter::new("test", 3);
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let l = Arc::clone(&l);
                thread::spawn(move || {
                    let _p = l.acquire();
                    thread::sleep(Duration::from_millis(5));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(l.peak() <= 3);
        assert_eq!(l.in_use(), 0);
    }

    #[test]
    fn test_permit_released_on_panic() {
        let l = Limiter::new("test", 1);
        let l2 = Arc::clone(&l);
        let r = thread::spawn(move || {
            let _p = l2.acquire();
            panic!("task failed");
        })
        .join();
        assert!(r.is_err());
        assert_eq!(l.in_use(), 0);
    }
}
