use serde::Serialize;

use crate::stack::MAX_DEPTH;

/// A single recorded allocation or deallocation event.
///
/// The tracker builds one event per intercepted call and immediately pushes it
/// into an [`EventLog`](crate::EventLog); events are never mutated afterwards.
/// Copying a record into another log (during leak reconciliation) is a plain
/// [`Clone`].
///
/// A `size` of zero marks a deallocation event.
#[derive(Debug, Clone, Serialize)]
pub struct AllocEvent {
    /// Address of the allocation. Opaque identity, never dereferenced.
    pub addr: usize,
    /// Requested size in bytes; 0 for deallocation events.
    pub size: usize,
    /// Process-wide event sequence number, assigned by the tracker.
    pub seq: u64,
    /// OS id of the thread that performed the call.
    pub tid: u64,
    /// Captured stack trace, most recent call first.
    pub frames: Vec<String>,
}

impl AllocEvent {
    pub fn new(addr: usize, size: usize, seq: u64, tid: u64, frames: Vec<String>) -> Self {
        debug_assert!(frames.len() <= MAX_DEPTH);
        Self {
            addr,
            size,
            seq,
            tid,
            frames,
        }
    }

    /// Number of captured stack frames. Always equals `frames.len()` and never
    /// exceeds [`MAX_DEPTH`].
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_matches_frames() {
        let event = AllocEvent::new(
            0x1000,
            64,
            0,
            7,
            vec!["a".to_string(), "b".to_string()],
        );
        assert_eq!(event.frame_count(), 2);
        assert_eq!(event.frame_count(), event.frames.len());
    }

    #[test]
    fn zero_size_marks_deallocation() {
        let event = AllocEvent::new(0x2000, 0, 1, 7, Vec::new());
        assert_eq!(event.size, 0);
        assert_eq!(event.frame_count(), 0);
    }
}
