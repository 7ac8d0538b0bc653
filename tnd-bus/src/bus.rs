use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tnd_common::Address;

use crate::clock::LogicalTime;

/// A message in flight, ordered by delivery time and then by send order
/// (`seq`) so that messages due at the same tick preserve FIFO order —
/// mirroring the `(scheduled_time, node_id, message_i)` tuple key the
/// reference queue sorts on.
struct Scheduled<M> {
    at: LogicalTime,
    seq: u64,
    to: Address,
    message: M,
}

impl<M> PartialEq for Scheduled<M> {
    fn eq(&self, other: &Self) -> bool {
        (self.at, self.seq) == (other.at, other.seq)
    }
}

impl<M> Eq for Scheduled<M> {}

impl<M> PartialOrd for Scheduled<M> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<M> Ord for Scheduled<M> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.at, self.seq).cmp(&(other.at, other.seq))
    }
}

/// A deterministic, single-process message bus and timeout scheduler.
///
/// Implements the Bus API (`send`/`schedule`/`recv`): a min-heap keyed by
/// delivery time, with insertion order breaking ties, in place of the
/// reference implementation's wall-clock `PriorityQueue`. Nothing here
/// sleeps or spawns; advancing time is just popping the next-due entry.
pub struct Bus<M> {
    queue: BinaryHeap<Reverse<Scheduled<M>>>,
    next_seq: u64,
    now: LogicalTime,
}

impl<M> Default for Bus<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Bus<M> {
    /// An empty bus, clock at zero.
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
            now: LogicalTime::ZERO,
        }
    }

    /// The bus's current logical time — the delivery time of the last
    /// message popped by [`Bus::recv`], or zero if nothing has been
    /// delivered yet.
    pub fn now(&self) -> LogicalTime {
        self.now
    }

    /// Enqueue `message` for FIFO delivery to `to` at the current time.
    pub fn send(&mut self, to: Address, message: M) {
        self.schedule(to, message, self.now);
    }

    /// Deliver `message` to `to` no earlier than `at`. `at` in the past is
    /// clamped to the bus's current time, matching the reference queue's
    /// `max(now, scheduled_time)` clamp.
    pub fn schedule(&mut self, to: Address, message: M, at: LogicalTime) {
        let at = at.max(self.now);
        let seq = self.next_seq;
        self.next_seq += 1;

        tracing::trace!(?to, ?at, seq, "enqueued message");

        self.queue.push(Reverse(Scheduled { at, seq, to, message }));
    }

    /// Convenience for scheduling `delay` ticks from now.
    pub fn schedule_after(&mut self, to: Address, message: M, delay: u64) {
        self.schedule(to, message, self.now + delay);
    }

    /// Pop the next due message, advancing the clock to its delivery time.
    /// Returns `None` once the queue is drained — the simulation harness
    /// treats an empty queue as "nothing left to do", unlike the reference
    /// implementation's `run()` loop, which asserts against it.
    pub fn recv(&mut self) -> Option<(Address, M)> {
        let Reverse(scheduled) = self.queue.pop()?;
        self.now = scheduled.at;

        tracing::trace!(to = ?scheduled.to, at = ?scheduled.at, "delivered message");

        Some((scheduled.to, scheduled.message))
    }

    /// Whether any message is still in flight.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// How many messages are currently in flight.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
