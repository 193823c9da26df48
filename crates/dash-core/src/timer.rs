//! Cancellable one-shot timers on a monotonic millisecond timeline.
//!
//! The queue does not sleep or spawn anything. Its owner asks for the next
//! deadline, waits however the host waits, then pops whatever is due.

use std::collections::BTreeMap;

/// Identifies a scheduled timer so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// A timer popped from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<K> {
    pub handle: TimerHandle,
    /// When the timer was due, which may be earlier than when it was popped.
    pub deadline_ms: u64,
    pub kind: K,
}

/// Pending timers ordered by deadline, ties in scheduling order.
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    next_seq: u64,
    pending: BTreeMap<(u64, u64), K>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<K> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `kind` to fire at `deadline_ms`.
    pub fn schedule(&mut self, kind: K, deadline_ms: u64) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert((deadline_ms, seq), kind);
        TimerHandle(seq)
    }

    /// Cancels a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(_, seq), _| *seq != handle.0);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Removes and returns the earliest timer due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Fired<K>> {
        let (&(deadline, _), _) = self.pending.first_key_value()?;
        if deadline > now_ms {
            return None;
        }
        self.pending
            .pop_first()
            .map(|((deadline_ms, seq), kind)| Fired {
                handle: TimerHandle(seq),
                deadline_ms,
                kind,
            })
    }
}
