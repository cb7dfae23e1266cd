use std::cell::Cell;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use arc_swap::ArcSwapOption;

use crate::log::EventLog;
use crate::record::AllocEvent;
use crate::report::{LeakEntry, LeakReport};
use crate::sink::LogSink;
use crate::stack;
use crate::tid::current_tid;

/// Recording configuration for one tracked session.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Session name, shown in the report.
    pub session: &'static str,
    /// Log every allocation/deallocation event to the sink, not just leaks.
    pub log_all: bool,
    /// Stack capture depth cap, clamped to [`MAX_DEPTH`](crate::MAX_DEPTH).
    pub max_depth: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            session: "leaktrail",
            log_all: true,
            max_depth: stack::MAX_DEPTH,
        }
    }
}

/// The allocation tracker: three append-only event logs plus the diff that
/// reconciles them at teardown.
///
/// The process-wide instance is installed by
/// [`GuardBuilder::build`](crate::GuardBuilder::build) and removed when the
/// [`LeakGuard`](crate::LeakGuard) drops; `Tracker` itself can also be
/// constructed directly against synthetic addresses, which is how the
/// reconciliation tests below work.
pub struct Tracker {
    allocated: EventLog,
    freed: EventLog,
    dangling: EventLog,
    sink: Option<LogSink>,
    config: TrackerConfig,
    seq: u64,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            allocated: EventLog::new(),
            freed: EventLog::new(),
            dangling: EventLog::new(),
            sink: None,
            config,
            seq: 0,
        }
    }

    pub(crate) fn with_sink(config: TrackerConfig, sink: LogSink) -> Self {
        let mut tracker = Self::new(config);
        tracker.sink = Some(sink);
        tracker
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    /// Records one allocation event. Captures the current call stack
    /// (degrading to zero frames if capture yields nothing) and appends to the
    /// `allocated` log. Never fails.
    pub fn record_allocation(&mut self, addr: usize, size: usize) {
        let frames = stack::capture(self.config.max_depth);
        let event = AllocEvent::new(addr, size, self.next_seq(), current_tid(), frames);
        if self.config.log_all {
            if let Some(sink) = &mut self.sink {
                sink.write_event("ALLOCATION", &event);
            }
        }
        self.allocated.push(event);
    }

    /// Records one deallocation event (size 0) into the `freed` log.
    pub fn record_deallocation(&mut self, addr: usize) {
        let frames = stack::capture(self.config.max_depth);
        let event = AllocEvent::new(addr, 0, self.next_seq(), current_tid(), frames);
        if self.config.log_all {
            if let Some(sink) = &mut self.sink {
                sink.write_event("DE-ALLOCATION", &event);
            }
        }
        self.freed.push(event);
    }

    /// Diffs allocations against frees and fills the `dangling` log with
    /// clones of the unmatched allocations (stack and size preserved).
    ///
    /// Matching is keyed by (address, sequence number): walking allocations
    /// oldest-first, each one consumes the earliest not-yet-consumed free of
    /// the same address that happened after it. A free that precedes every
    /// remaining allocation at its address matches nothing (wild free), and
    /// an allocation with no qualifying free is dangling. This is what makes
    /// address reuse come out right: alloc/free/alloc at one address reports
    /// exactly one leak, the second allocation.
    ///
    /// Runs exactly once, at teardown.
    pub fn reconcile(&mut self) {
        // addr -> index of the next unconsumed free in freed.seqs_for(addr)
        let mut cursor: HashMap<usize, usize> = HashMap::new();
        let mut leaked: Vec<AllocEvent> = Vec::new();

        for event in self.allocated.iter_chronological() {
            let seqs = self.freed.seqs_for(event.addr);
            let idx = cursor.entry(event.addr).or_insert(0);
            // Frees older than this allocation cannot match it, nor any later
            // allocation at this address.
            while *idx < seqs.len() && seqs[*idx] < event.seq {
                *idx += 1;
            }
            if *idx < seqs.len() {
                *idx += 1;
            } else {
                leaked.push(event.clone());
            }
        }

        for event in leaked {
            self.dangling.push(event);
        }
    }

    /// Snapshot of the dangling log as a report, entries newest-first.
    pub fn leak_report(&self) -> LeakReport {
        LeakReport {
            session: self.config.session.to_string(),
            allocations: self.allocated.len() as u64,
            frees: self.freed.len() as u64,
            leaked_bytes: self.dangling.iter().map(|e| e.size as u64).sum(),
            leaks: self.dangling.iter().map(LeakEntry::from).collect(),
        }
    }

    pub(crate) fn write_report_to_sink(&mut self, report: &LeakReport) {
        if let Some(sink) = &mut self.sink {
            sink.write_report(report);
        }
    }

    pub fn allocated(&self) -> &EventLog {
        &self.allocated
    }

    pub fn freed(&self) -> &EventLog {
        &self.freed
    }

    pub fn dangling(&self) -> &EventLog {
        &self.dangling
    }
}

pub(crate) static TRACKER_STATE: OnceLock<ArcSwapOption<RwLock<Tracker>>> = OnceLock::new();

pub(crate) fn state() -> &'static ArcSwapOption<RwLock<Tracker>> {
    TRACKER_STATE.get_or_init(|| ArcSwapOption::from(None))
}

thread_local! {
    // Cleared while the tracker runs its own bookkeeping so the hooks route
    // those allocations straight to the raw allocator. This is the structural
    // re-entrancy break: without it every recorded event would recursively
    // trigger another recording.
    static TRACKING_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Runs `f` with hook notifications suppressed on this thread.
pub(crate) fn with_tracking_suppressed<R>(f: impl FnOnce() -> R) -> R {
    TRACKING_ENABLED.with(|enabled| {
        let was = enabled.replace(false);
        let result = f();
        enabled.set(was);
        result
    })
}

/// Allocation-hook entry point. No-op when no tracker is installed or when
/// the calling thread is inside tracker bookkeeping.
#[inline]
pub(crate) fn notify_alloc(addr: usize, size: usize) {
    TRACKING_ENABLED.with(|enabled| {
        if !enabled.get() {
            return;
        }
        enabled.set(false);
        if let Some(state) = state().load_full() {
            if let Ok(mut tracker) = state.write() {
                tracker.record_allocation(addr, size);
            }
        }
        enabled.set(true);
    });
}

/// Deallocation-hook entry point. Same suppression rules as [`notify_alloc`].
#[inline]
pub(crate) fn notify_dealloc(addr: usize) {
    TRACKING_ENABLED.with(|enabled| {
        if !enabled.get() {
            return;
        }
        enabled.set(false);
        if let Some(state) = state().load_full() {
            if let Ok(mut tracker) = state.write() {
                tracker.record_deallocation(addr);
            }
        }
        enabled.set(true);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> Tracker {
        Tracker::new(TrackerConfig {
            session: "test",
            log_all: false,
            max_depth: 4,
        })
    }

    #[test]
    fn empty_session_is_clean() {
        let mut t = tracker();
        t.reconcile();
        assert!(t.dangling().is_empty());
        assert!(t.leak_report().is_clean());
    }

    #[test]
    fn matched_pairs_leave_no_dangling() {
        for n in [0usize, 1, 100] {
            let mut t = tracker();
            for i in 0..n {
                t.record_allocation(0x1000 + i * 16, 8);
            }
            for i in 0..n {
                t.record_deallocation(0x1000 + i * 16);
            }
            t.reconcile();
            assert!(t.dangling().is_empty(), "n = {n}");
        }
    }

    #[test]
    fn out_of_order_frees_still_match() {
        let mut t = tracker();
        t.record_allocation(0xa, 8);
        t.record_allocation(0xb, 16);
        t.record_allocation(0xc, 32);
        t.record_deallocation(0xb);
        t.record_deallocation(0xa);
        t.reconcile();

        assert_eq!(t.dangling().len(), 1);
        let leak = t.dangling().iter().next().unwrap();
        assert_eq!(leak.addr, 0xc);
        assert_eq!(leak.size, 32);
    }

    #[test]
    fn unmatched_allocation_is_reported_once() {
        let mut t = tracker();
        t.record_allocation(0x1000, 64);
        t.reconcile();

        assert_eq!(t.dangling().len(), 1);
        let leak = t.dangling().iter().next().unwrap();
        assert_eq!(leak.addr, 0x1000);
        assert_eq!(leak.size, 64);
        assert!(!leak.frames.is_empty());
        assert_eq!(leak.frame_count(), leak.frames.len());
    }

    #[test]
    fn address_reuse_reports_the_second_allocation() {
        let mut t = tracker();
        t.record_allocation(0x1000, 16);
        t.record_deallocation(0x1000);
        t.record_allocation(0x1000, 32);
        t.reconcile();

        // The free matched the first allocation; the reuse leaked.
        assert_eq!(t.dangling().len(), 1);
        let leak = t.dangling().iter().next().unwrap();
        assert_eq!(leak.size, 32);
    }

    #[test]
    fn free_before_alloc_matches_nothing() {
        let mut t = tracker();
        t.record_deallocation(0x2000);
        t.record_allocation(0x2000, 8);
        t.reconcile();

        assert_eq!(t.dangling().len(), 1);
        assert_eq!(t.dangling().iter().next().unwrap().size, 8);
    }

    #[test]
    fn wild_free_alone_is_clean() {
        let mut t = tracker();
        t.record_deallocation(0x3000);
        t.reconcile();
        assert!(t.dangling().is_empty());
    }

    #[test]
    fn report_counts_and_order() {
        let mut t = tracker();
        t.record_allocation(0x10, 8);
        t.record_allocation(0x20, 16);
        t.record_deallocation(0x10);
        t.record_allocation(0x30, 32);
        t.reconcile();

        let report = t.leak_report();
        assert_eq!(report.allocations, 3);
        assert_eq!(report.frees, 1);
        assert_eq!(report.leaked_bytes, 48);
        assert_eq!(report.leaks.len(), 2);
        // Newest-first: the 0x30 allocation happened last.
        assert_eq!(report.leaks[0].addr, 0x30);
        assert_eq!(report.leaks[1].addr, 0x20);
    }

    #[test]
    fn suppressed_scope_restores_flag() {
        let result = with_tracking_suppressed(|| {
            with_tracking_suppressed(|| 1 + 1)
        });
        assert_eq!(result, 2);
        TRACKING_ENABLED.with(|enabled| assert!(enabled.get()));
    }
}
