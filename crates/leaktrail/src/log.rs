use std::collections::HashMap;

use crate::record::AllocEvent;

/// Append-only store of [`AllocEvent`]s, iterated newest-first.
///
/// Events are pushed in chronological order and owned by the log until it is
/// dropped. An address index keeps [`find`](EventLog::find) O(1) average
/// instead of a scan.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<AllocEvent>,
    by_addr: HashMap<usize, Vec<u64>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event`; it becomes the new most-recent entry. Never fails.
    pub fn push(&mut self, event: AllocEvent) {
        self.by_addr.entry(event.addr).or_default().push(event.seq);
        self.events.push(event);
    }

    /// Whether any event in the log has the given address.
    pub fn find(&self, addr: usize) -> bool {
        self.by_addr.contains_key(&addr)
    }

    /// Events, newest first. Each call starts a fresh traversal from the
    /// current front.
    pub fn iter(&self) -> impl Iterator<Item = &AllocEvent> {
        self.events.iter().rev()
    }

    /// Events in push (chronological) order. Reconciliation walks allocations
    /// this way so sequence numbers ascend.
    pub(crate) fn iter_chronological(&self) -> impl Iterator<Item = &AllocEvent> {
        self.events.iter()
    }

    /// Sequence numbers of events at `addr`, ascending.
    pub(crate) fn seqs_for(&self, addr: usize) -> &[u64] {
        self.by_addr.get(&addr).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
