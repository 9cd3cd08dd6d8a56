use super::error::ScheduleError;
use super::event::EventKind;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// An event waiting in the queue, stamped with an insertion sequence number
/// so that same-time, same-priority events replay in insertion order.
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub time: f64,
    pub kind: EventKind,
    sequence_num: u64,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.sequence_num == other.sequence_num
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default).
        // Total order: time, then kind priority, then insertion sequence.
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.kind.priority().cmp(&self.kind.priority()))
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Time-ordered queue of discrete events.
///
/// The clock is `f64` seconds from midnight. Scheduling never rejects
/// past-dated inserts; normal flow only ever schedules at `now` or
/// `now + nonnegative duration`, and the one retiming operation
/// (`shift_done_within`) moves events forward, never backward.
pub struct EventScheduler {
    event_queue: BinaryHeap<ScheduledEvent>,
    sequence_counter: u64,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
        }
    }

    /// Insert an event at the given absolute time.
    pub fn schedule(&mut self, time: f64, kind: EventKind) -> Result<(), ScheduleError> {
        if time.is_nan() || time < 0.0 {
            return Err(ScheduleError::InvalidTime(time));
        }
        self.event_queue.push(ScheduledEvent {
            time,
            kind,
            sequence_num: self.sequence_counter,
        });
        self.sequence_counter += 1;
        Ok(())
    }

    /// Remove and return the earliest event, or `None` when the queue is empty.
    pub fn pop_next(&mut self) -> Option<ScheduledEvent> {
        self.event_queue.pop()
    }

    /// Timestamp of the next event without removing it.
    pub fn peek_time(&self) -> Option<f64> {
        self.event_queue.peek().map(|event| event.time)
    }

    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.event_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_queue.is_empty()
    }

    /// Push every queued `Done` event whose time lies strictly inside
    /// `(pause_start, pause_end)` forward by the pause length. All other
    /// events keep their timestamps. Returns how many events moved.
    pub fn shift_done_within(&mut self, pause_start: f64, pause_end: f64) -> usize {
        let shift = pause_end - pause_start;
        let mut shifted = 0;
        let mut retained = Vec::with_capacity(self.event_queue.len());

        while let Some(mut event) = self.event_queue.pop() {
            if event.kind.is_done() && event.time > pause_start && event.time < pause_end {
                event.time += shift;
                shifted += 1;
            }
            retained.push(event);
        }
        for event in retained {
            self.event_queue.push(event);
        }
        shifted
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}
