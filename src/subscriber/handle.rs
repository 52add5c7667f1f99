use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use crate::broker::queue::OutboundQueue;
use crate::broker::topic::SubscriberId;

/// A live subscriber connection in the fan-out system.
///
/// Each subscriber is uniquely identified by an `id` and owns a bounded
/// outbound queue the dispatcher pushes events onto. The connection's read
/// side calls [`Subscriber::touch`] whenever any frame arrives, so the
/// heartbeat reaper can tell live connections from dead ones.
#[derive(Debug)]
pub struct Subscriber {
    /// Unique identifier for the subscriber (UUID-based connection id).
    pub id: SubscriberId,

    /// Bounded FIFO queue of events awaiting delivery to this subscriber.
    pub queue: Arc<OutboundQueue>,

    /// Unix millis of the last inbound frame from this connection.
    last_seen: AtomicI64,
}

impl Subscriber {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            id: format!("subscriber-{}", uuid::Uuid::new_v4()),
            queue: Arc::new(OutboundQueue::new(queue_capacity)),
            last_seen: AtomicI64::new(Utc::now().timestamp_millis()),
        }
    }

    /// Records a sign of life from the connection.
    pub fn touch(&self) {
        self.last_seen
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Milliseconds since the last inbound frame.
    pub fn idle_ms(&self) -> i64 {
        (Utc::now().timestamp_millis() - self.last_seen.load(Ordering::Relaxed)).max(0)
    }
}
