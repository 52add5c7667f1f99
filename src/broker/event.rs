use serde::{Deserialize, Serialize};

/// A published event in the fan-out system.
///
/// An event consists of a topic identifier, a per-topic sequence number
/// assigned at publish time, the payload content, and a timestamp indicating
/// when it was published. Events are immutable once published; the broker
/// clones one copy onto each subscriber's outbound queue.
///
/// This structure is serialized to JSON for delivery over WebSocket.
///
/// # Fields
///
/// - `topic` - The name of the topic this event belongs to.
/// - `seq` - Monotonically increasing sequence number, scoped to the topic.
/// - `payload` - The actual event content, usually a JSON-encoded string.
/// - `timestamp` - Unix timestamp in milliseconds at publish time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub topic: String,
    pub seq: u64,
    pub payload: String,
    pub timestamp: i64,
}
