//! Wake-up queue for the simulation engine.
//!
//! Entries are ordered by simulated time, then by the sequence number they
//! were scheduled with, so two actors waking at the same instant always run
//! in the order they were scheduled.

use crate::core::time::SimTime;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Index of an actor inside a [`Simulation`](super::Simulation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub(crate) usize);

impl ActorId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An actor resume scheduled for a specific simulation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledWake {
    time: SimTime,
    sequence: u64,
    actor: ActorId,
}

impl ScheduledWake {
    pub fn new(time: SimTime, sequence: u64, actor: ActorId) -> Self {
        Self {
            time,
            sequence,
            actor,
        }
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }
}

impl PartialOrd for ScheduledWake {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledWake {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max heap; reverse so the earliest (time, sequence) pops first
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Priority queue of pending actor resumes.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<ScheduledWake>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `actor` to resume at `time`
    pub fn schedule(&mut self, time: SimTime, actor: ActorId) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(ScheduledWake::new(time, sequence, actor));
    }

    pub fn pop_earliest(&mut self) -> Option<ScheduledWake> {
        self.heap.pop()
    }

    pub fn peek_earliest(&self) -> Option<&ScheduledWake> {
        self.heap.peek()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
