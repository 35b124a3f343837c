//! Bounded, deadline-ordered event queue.
//!
//! A min-heap over `(deadline, insertion sequence)`: pops always yield the
//! earliest deadline, and events with equal deadlines come out FIFO. The
//! capacity is a soft limit: [`EventQueue`] itself never refuses an insert;
//! the scheduler core consults [`EventQueue::is_saturated`] to throttle
//! producers.

use crate::event::Event;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::DEFAULT_BUFFER_SIZE;

/// Heap entry: the insertion sequence number breaks deadline ties so the
/// externally observable order is a stable min-heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    evt: Event,
    seq: u64,
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.evt
            .deadline()
            .cmp(&other.evt.deadline())
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Deadline-ordered priority queue with a soft capacity.
#[derive(Debug)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    seq: u64,
    latest: Option<Event>,
    capacity: usize,
}

impl EventQueue {
    /// An empty queue with the default soft capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }

    /// An empty queue throttling at `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "event queue capacity must be non-zero");
        Self {
            heap: BinaryHeap::with_capacity(capacity + 1),
            seq: 0,
            latest: None,
            capacity,
        }
    }

    /// Insert `evt`, preserving heap order.
    pub fn insert(&mut self, evt: Event) {
        let seq = self.seq;
        self.seq += 1;
        // `>=` so the most recently scheduled of equal-deadline events is
        // reported as the tail.
        if self.latest.map_or(true, |tail| evt.deadline() >= tail.deadline()) {
            self.latest = Some(evt);
        }
        self.heap.push(Reverse(Entry { evt, seq }));
    }

    /// Remove and return the earliest-deadline event.
    pub fn pop_min(&mut self) -> Option<Event> {
        let evt = self.heap.pop().map(|Reverse(entry)| entry.evt);
        if self.heap.is_empty() {
            self.latest = None;
        }
        evt
    }

    /// The latest-scheduled event, the one producers chain new work after.
    ///
    /// Tracked as a running maximum: the maximum-deadline event is only
    /// popped once every remaining event shares its deadline, so the value
    /// stays exact until the queue drains.
    pub fn peek_latest(&self) -> Option<&Event> {
        self.latest.as_ref()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue holds no events.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Whether the queue has reached its soft capacity.
    pub fn is_saturated(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Current soft capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the soft capacity.
    pub fn set_capacity(&mut self, capacity: usize) {
        assert!(capacity > 0, "event queue capacity must be non-zero");
        self.capacity = capacity;
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
