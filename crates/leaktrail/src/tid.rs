//! OS thread-id capture for event provenance.

/// Returns the OS-level id of the calling thread.
///
/// Linux uses `gettid`, macOS the Mach thread id. Other platforms fall back to
/// 0 rather than failing a diagnostic build.
#[inline]
pub(crate) fn current_tid() -> u64 {
    #[cfg(target_os = "linux")]
    {
        unsafe { libc::syscall(libc::SYS_gettid) as u64 }
    }

    #[cfg(target_os = "macos")]
    {
        unsafe { libc::pthread_mach_thread_np(libc::pthread_self()) as u64 }
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        0
    }
}
