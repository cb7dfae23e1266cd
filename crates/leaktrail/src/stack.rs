//! Stack-capture collaborator.
//!
//! Capture is best-effort: a frame that cannot be resolved degrades to an
//! address-only line, and a capture that produces nothing degrades to an empty
//! vec. It never errors and never surfaces a failure to the recording path.

/// Hard cap on frames captured per event. The tracker clamps its configured
/// depth to this.
pub const MAX_DEPTH: usize = 20;

/// Captures the current call stack as human-readable lines, most recent call
/// first, up to `max_depth` frames.
pub fn capture(max_depth: usize) -> Vec<String> {
    let max_depth = max_depth.min(MAX_DEPTH);
    let mut frames = Vec::with_capacity(max_depth);
    if max_depth == 0 {
        return frames;
    }

    backtrace::trace(|frame| {
        let ip = frame.ip() as usize;
        let mut line = None;
        backtrace::resolve(frame.ip(), |symbol| {
            // resolve() can call back once per inlined frame; keep the first.
            if line.is_none() {
                if let Some(name) = symbol.name() {
                    line = Some(format!("{name} [{ip:#x}]"));
                }
            }
        });
        frames.push(line.unwrap_or_else(|| format!("<unresolved> [{ip:#x}]")));
        frames.len() < max_depth
    });

    frames
}
