use serde::Deserialize;

use crate::broker::queue::BackpressurePolicy;

/// Top-level configuration settings for the application.
///
/// Includes settings for both the server and the broker.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub broker: BrokerSettings,
}

/// Configuration settings for the server.
///
/// Defines the host and port the server will bind to, and the log level.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

/// Configuration settings for the broker.
///
/// Controls per-subscriber queue capacity, the heartbeat timeout used by the
/// idle reaper, the backpressure policy applied when a queue fills up, topic
/// lifecycle behavior, and transport send retries.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub queue_capacity: usize,
    pub heartbeat_timeout_secs: u64,
    pub backpressure_policy: BackpressurePolicy,
    pub create_topic_on_publish: bool,
    pub retain_empty_topics: bool,
    pub max_send_retries: u8,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
}

/// Partial server settings.
///
/// Used when loading server configuration from external sources with optional values.
#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Partial broker settings.
///
/// Used for broker configuration from external sources with optional values.
#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub queue_capacity: Option<usize>,
    pub heartbeat_timeout_secs: Option<u64>,
    pub backpressure_policy: Option<BackpressurePolicy>,
    pub create_topic_on_publish: Option<bool>,
    pub retain_empty_topics: Option<bool>,
    pub max_send_retries: Option<u8>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            broker: BrokerSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
        }
    }
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            heartbeat_timeout_secs: 30,
            backpressure_policy: BackpressurePolicy::DisconnectSubscriber,
            create_topic_on_publish: true,
            retain_empty_topics: false,
            max_send_retries: 3,
        }
    }
}
