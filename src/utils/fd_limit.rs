//! File descriptor limit detection for capping the file pool (Unix).

/// Descriptors kept free for the walk, stdio, the output file and the runtime.
pub const RESERVED_FDS: usize = 32;

/// Fraction of the process FD limit the file pool may use.
const FD_LIMIT_FRACTION: f64 = 0.8;

/// Returns the soft limit for max open file descriptors, or `None` if unavailable (e.g. Windows).
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let rlim = unsafe { rlim.assume_init() };
    let cur = rlim.rlim_cur;
    // RLIM_INFINITY is typically !0 or u64::MAX; treat as "no practical limit"
    if cur == libc::RLIM_INFINITY || cur > i64::MAX as u64 {
        return None;
    }
    Some(cur)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Max files the pool may hold open at once, or `None` when there is no usable limit.
/// Each file task holds exactly one descriptor while it reads.
pub fn max_files_by_fd_limit() -> Option<usize> {
    let limit = max_open_fds()?;
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    Some(usable.saturating_sub(RESERVED_FDS).max(1))
}

/// Cap a requested file pool width by the FD limit. Never returns 0.
pub fn cap_file_width(requested: usize) -> usize {
    let requested = requested.max(1);
    match max_files_by_fd_limit() {
        Some(cap) if cap < requested => {
            log::debug!(
                "File pool width {} capped to {} by the open-file limit",
                requested,
                cap
            );
            cap
        }
        _ => requested,
    }
}
