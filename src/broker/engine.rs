use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::broker::event::Event;
use crate::broker::queue::PushOutcome;
use crate::broker::topic::{SubscriberId, Topic};
use crate::config::BrokerSettings;
use crate::subscriber::Subscriber;
use crate::utils::error::PublishError;

/// The broker that manages topics and subscribers.
///
/// It combines the topic registry, subscription lifecycle, sequence-assigning
/// publisher, and fan-out dispatcher behind one concurrent type. Topics and
/// subscribers live in sharded maps, so subscribe/unsubscribe and publishes
/// on different topics proceed in parallel; the per-topic entry is the only
/// serialization point, and it is held just long enough to assign a sequence
/// number and enqueue the event onto each subscriber's outbound queue.
///
/// All methods take `&self`; the transport shares the broker as `Arc<Broker>`
/// with no outer lock.
#[derive(Debug)]
pub struct Broker {
    topics: DashMap<String, Topic>,
    subscribers: DashMap<SubscriberId, Arc<Subscriber>>,
    settings: BrokerSettings,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(BrokerSettings::default())
    }
}

impl Broker {
    pub fn new(settings: BrokerSettings) -> Self {
        Self {
            topics: DashMap::new(),
            subscribers: DashMap::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &BrokerSettings {
        &self.settings
    }

    /// Registers a new subscriber with the broker. Called when a connection
    /// opens, before the subscriber joins any topic.
    pub fn register_subscriber(&self, subscriber: Arc<Subscriber>) {
        self.subscribers.insert(subscriber.id.clone(), subscriber);
    }

    /// Looks up a live subscriber by id.
    pub fn get_subscriber(&self, id: &SubscriberId) -> Option<Arc<Subscriber>> {
        self.subscribers.get(id).map(|entry| entry.value().clone())
    }

    /// Subscribes a subscriber to a topic. Automatically creates the topic if
    /// it doesn't exist. Subscribing twice is an idempotent no-op.
    pub fn subscribe(&self, topic: &str, subscriber: SubscriberId) {
        let mut entry = self
            .topics
            .entry(topic.to_string())
            .or_insert_with(|| Topic::new(topic));
        entry.subscribe(subscriber);
    }

    /// Unsubscribes a subscriber from a topic. Unknown topic or subscriber is
    /// a silent no-op. The topic is destroyed when its last subscriber leaves
    /// unless empty-topic retention is configured.
    pub fn unsubscribe(&self, topic: &str, subscriber: &SubscriberId) {
        let mut now_empty = false;
        if let Some(mut entry) = self.topics.get_mut(topic) {
            entry.unsubscribe(subscriber);
            now_empty = entry.subscribers.is_empty();
        }
        if now_empty && !self.settings.retain_empty_topics {
            self.topics
                .remove_if(topic, |_, t| t.subscribers.is_empty());
        }
    }

    /// Returns the ids currently subscribed to a topic. Empty for unknown
    /// topics.
    pub fn list_subscribers(&self, topic: &str) -> Vec<SubscriberId> {
        self.topics
            .get(topic)
            .map(|entry| entry.subscribers.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn topic_exists(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    /// Publishes a payload to a topic and returns the assigned sequence
    /// number.
    ///
    /// The sequence number is claimed and the event enqueued onto every
    /// current subscriber's queue while the topic entry is held, so each
    /// subscriber sees this topic's events in sequence order. Delivery itself
    /// is asynchronous; this method never waits on a subscriber.
    ///
    /// Unknown topics are created lazily when `create_topic_on_publish` is
    /// set, rejected otherwise. Publishing to a topic with no subscribers
    /// succeeds and delivers nothing.
    ///
    /// Sequence numbers are monotonic for the lifetime of a topic. A topic
    /// that loses its last subscriber is destroyed and takes its counter with
    /// it, so a lazily recreated topic numbers from 1 again; set
    /// `retain_empty_topics` to keep numbering continuous across empty spells.
    pub fn publish(&self, topic: &str, payload: String) -> Result<u64, PublishError> {
        // The exclusive entry guard serializes publishes on this topic, which
        // keeps sequence assignment and enqueue order consistent for every
        // subscriber. Publishes on other topics are unaffected.
        let entry = if self.settings.create_topic_on_publish {
            self.topics
                .entry(topic.to_string())
                .or_insert_with(|| Topic::new(topic))
        } else {
            match self.topics.get_mut(topic) {
                Some(entry) => entry,
                None => return Err(PublishError::UnknownTopic(topic.to_string())),
            }
        };

        let seq = entry.next_seq();
        let event = Event {
            topic: topic.to_string(),
            seq,
            payload,
            timestamp: Utc::now().timestamp_millis(),
        };

        let overflowed = self.fan_out(&entry, event);
        drop(entry);

        // Evict overflowed subscribers only after releasing the topic entry.
        for id in overflowed {
            warn!(subscriber = %id, topic, "outbound queue overflow, evicting subscriber");
            self.cleanup_subscriber(&id);
        }

        Ok(seq)
    }

    /// Fans an event out to every subscriber of `topic`, applying the
    /// configured backpressure policy. Returns the ids whose queues
    /// overflowed under `DisconnectSubscriber`.
    fn fan_out(&self, topic: &Topic, event: Event) -> Vec<SubscriberId> {
        let mut overflowed = Vec::new();
        for id in &topic.subscribers {
            let Some(subscriber) = self.subscribers.get(id) else {
                debug!(subscriber = %id, "no live subscriber for id, skipping");
                continue;
            };
            match subscriber
                .queue
                .push(event.clone(), self.settings.backpressure_policy)
            {
                PushOutcome::Enqueued => {}
                PushOutcome::DroppedOldest => {
                    warn!(subscriber = %id, topic = %topic.name, "queue full, dropped oldest event");
                }
                PushOutcome::DroppedNewest => {
                    warn!(subscriber = %id, topic = %topic.name, seq = event.seq, "queue full, dropped event");
                }
                PushOutcome::Overflow => overflowed.push(id.clone()),
                PushOutcome::Closed => {}
            }
        }
        overflowed
    }

    /// Removes a subscriber entirely: closes its queue (cancelling in-flight
    /// delivery), drops it from every topic, and releases it. Used on
    /// disconnect, heartbeat timeout, and queue overflow eviction. Idempotent.
    pub fn cleanup_subscriber(&self, id: &SubscriberId) {
        if let Some((_, subscriber)) = self.subscribers.remove(id) {
            subscriber.queue.close();
        }
        self.topics.retain(|_, topic| {
            topic.unsubscribe(id);
            self.settings.retain_empty_topics || !topic.subscribers.is_empty()
        });
        info!(subscriber = %id, "cleaned up subscriber");
    }

    /// Evicts every subscriber that has been silent longer than the
    /// configured heartbeat timeout. Returns the evicted ids. Run
    /// periodically from a background task.
    pub fn reap_idle(&self) -> Vec<SubscriberId> {
        let timeout_ms = self.settings.heartbeat_timeout_secs as i64 * 1000;
        let stale: Vec<SubscriberId> = self
            .subscribers
            .iter()
            .filter(|entry| entry.value().idle_ms() > timeout_ms)
            .map(|entry| entry.key().clone())
            .collect();
        for id in &stale {
            info!(subscriber = %id, "heartbeat timeout, evicting subscriber");
            self.cleanup_subscriber(id);
        }
        stale
    }
}
