//! Time-ordered event queue
//!
//! Entries are kept sorted by `(time, priority, seq)`. The sequence number
//! is a monotonically increasing insertion counter: it breaks ties between
//! entries with equal time and priority (FIFO) and doubles as the value
//! behind the cancellation handle.
//!
//! The queue is generic over the action payload so it can be exercised in
//! isolation; the scheduler instantiates it with boxed callables.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Schedule Point
// ============================================================================

/// A point to schedule at: relative to "now", or absolute on the clock
///
/// Plain seconds and [`Duration`] values convert into the relative form,
/// so most call sites pass a number. The absolute form is only meaningful
/// for one-shot entries; recurring registration rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum When {
    /// Relative delay in seconds from the current clock time
    Delay(f64),
    /// Absolute time on the scheduler clock's timeline
    At(f64),
}

impl From<f64> for When {
    fn from(secs: f64) -> Self {
        Self::Delay(secs)
    }
}

impl From<Duration> for When {
    fn from(duration: Duration) -> Self {
        Self::Delay(duration.as_secs_f64())
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Opaque handle to a queued entry, usable for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventHandle(pub(crate) u64);

impl EventHandle {
    /// Numeric identity of the underlying entry
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Entry
// ============================================================================

/// One scheduled invocation, owned by the queue until popped
pub struct Entry<A> {
    /// Absolute scheduled time
    pub time: f64,
    /// Lower value fires first among entries with equal time
    pub priority: i32,
    /// Insertion counter; final tie-break
    pub seq: u64,
    /// Payload invoked when the entry fires
    pub action: A,
}

impl<A> Entry<A> {
    fn sorts_before(&self, time: f64, priority: i32, seq: u64) -> bool {
        match self.time.total_cmp(&time) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => (self.priority, self.seq) <= (priority, seq),
        }
    }
}

// ============================================================================
// Event Queue
// ============================================================================

/// Ordered collection of scheduled entries
pub struct EventQueue<A> {
    entries: Vec<Entry<A>>,
    next_seq: u64,
}

impl<A> EventQueue<A> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Insert an entry at its sorted position and return its handle
    pub fn insert(&mut self, time: f64, priority: i32, action: A) -> EventHandle {
        let seq = self.next_seq;
        self.next_seq += 1;

        let index = self
            .entries
            .partition_point(|entry| entry.sorts_before(time, priority, seq));
        self.entries.insert(
            index,
            Entry {
                time,
                priority,
                seq,
                action,
            },
        );

        EventHandle(seq)
    }

    /// Remove the entry behind `handle`
    ///
    /// Fails with [`Error::NotFound`] if the entry already fired or was
    /// already cancelled; the queue is left unchanged in that case.
    pub fn cancel(&mut self, handle: EventHandle) -> Result<()> {
        match self.entries.iter().position(|entry| entry.seq == handle.0) {
            Some(index) => {
                self.entries.remove(index);
                Ok(())
            }
            None => Err(Error::NotFound),
        }
    }

    /// Time and priority of the earliest entry, if any
    pub fn peek(&self) -> Option<(f64, i32)> {
        self.entries.first().map(|entry| (entry.time, entry.priority))
    }

    /// Remove and return the earliest entry
    pub fn pop_front(&mut self) -> Option<Entry<A>> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    /// Remove the earliest entry that is due at `now` and was inserted
    /// before `before_seq`
    ///
    /// Entries inserted later than the snapshot sit in the queue untouched,
    /// even when their time is already due; a non-blocking drain pass uses
    /// this to avoid retroactively including entries it created itself.
    pub fn pop_due(&mut self, now: f64, before_seq: u64) -> Option<Entry<A>> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.time <= now && entry.seq < before_seq)?;
        Some(self.entries.remove(index))
    }

    /// Sequence number the next insertion will receive
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A> Default for EventQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}
