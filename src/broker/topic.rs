use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

pub type SubscriberId = String;

/// Represents a topic in the broker system.
///
/// A topic has a name, a set of subscriber ids, and its own monotonically
/// increasing sequence counter. The counter is the only per-topic state that
/// publishers contend on; every published event on this topic carries the
/// next value.
///
/// Subscribing twice is a no-op, as is unsubscribing an id that was never
/// subscribed.
#[derive(Debug)]
pub struct Topic {
    pub name: String,
    pub subscribers: HashSet<SubscriberId>,
    next_seq: AtomicU64,
}

impl Topic {
    /// Creates a new topic with the given name, no subscribers, and a
    /// sequence counter starting at 1.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashSet::new(),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Adds a subscriber id to the topic. Idempotent.
    pub fn subscribe(&mut self, id: SubscriberId) {
        self.subscribers.insert(id);
    }

    /// Removes a subscriber id from the topic. No effect if absent.
    pub fn unsubscribe(&mut self, id: &SubscriberId) {
        self.subscribers.remove(id);
    }

    /// Claims and returns the next sequence number for this topic.
    pub fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst)
    }
}
