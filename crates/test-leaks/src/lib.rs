//! Helpers shared by the leaktrail scenario examples.

/// Leaks a heap allocation of exactly `n` bytes and returns its address.
pub fn leak_bytes(n: usize) -> usize {
    let buf = vec![0u8; n].into_boxed_slice();
    Box::leak(buf).as_ptr() as usize
}

/// Temp-dir sink path unique to this process, so parallel runs don't clobber
/// each other's logs.
pub fn sink_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("leaktrail-{}-{}.log", name, std::process::id()))
}
