use std::collections::VecDeque;
use std::sync::Mutex;

use serde::Deserialize;
use tokio::sync::Notify;

use crate::broker::event::Event;

/// What to do when a subscriber's outbound queue is full.
///
/// `DisconnectSubscriber` is the default: a subscriber that cannot keep up is
/// treated as dead and evicted, so the ordering guarantees for everyone else
/// stay intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpressurePolicy {
    DropOldest,
    DropNewest,
    DisconnectSubscriber,
}

impl Default for BackpressurePolicy {
    fn default() -> Self {
        BackpressurePolicy::DisconnectSubscriber
    }
}

/// Result of a single non-blocking push onto an [`OutboundQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Event enqueued normally.
    Enqueued,
    /// Queue was full; the oldest pending event was discarded to make room.
    DroppedOldest,
    /// Queue was full; the new event was discarded.
    DroppedNewest,
    /// Queue was full under `DisconnectSubscriber`; the caller must evict.
    Overflow,
    /// Queue has been closed; the subscriber is gone.
    Closed,
}

struct QueueState {
    items: VecDeque<Event>,
    closed: bool,
}

/// Bounded FIFO delivery queue owned by a single subscriber.
///
/// The dispatcher pushes from any publisher thread without blocking; the
/// subscriber's send loop is the sole consumer, which preserves per-topic
/// delivery order for that subscriber. Closing the queue cancels in-flight
/// delivery: pending events are dropped and the consumer wakes with `None`.
pub struct OutboundQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    capacity: usize,
}

impl OutboundQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            notify: Notify::new(),
            capacity,
        }
    }

    /// Attempts to enqueue an event, applying `policy` if the queue is full.
    /// Never blocks.
    pub fn push(&self, event: Event, policy: BackpressurePolicy) -> PushOutcome {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return PushOutcome::Closed;
        }
        if state.items.len() >= self.capacity {
            return match policy {
                BackpressurePolicy::DropOldest => {
                    state.items.pop_front();
                    state.items.push_back(event);
                    self.notify.notify_one();
                    PushOutcome::DroppedOldest
                }
                BackpressurePolicy::DropNewest => PushOutcome::DroppedNewest,
                BackpressurePolicy::DisconnectSubscriber => PushOutcome::Overflow,
            };
        }
        state.items.push_back(event);
        self.notify.notify_one();
        PushOutcome::Enqueued
    }

    /// Waits for the next event. Returns `None` once the queue is closed and
    /// will never yield again after that.
    pub async fn pop(&self) -> Option<Event> {
        loop {
            {
                let mut state = self.state.lock().unwrap();
                if let Some(event) = state.items.pop_front() {
                    return Some(event);
                }
                if state.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Closes the queue, discarding anything still pending and waking the
    /// consumer. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        state.items.clear();
        // notify_one leaves a permit, so a consumer about to await still sees
        // the close instead of sleeping forever.
        self.notify.notify_one();
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}

impl std::fmt::Debug for OutboundQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("OutboundQueue")
            .field("capacity", &self.capacity)
            .field("len", &state.items.len())
            .field("closed", &state.closed)
            .finish()
    }
}
