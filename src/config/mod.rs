mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{BrokerSettings, ServerSettings, Settings};

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the server and broker configurations
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
            log_level: partial
                .server
                .as_ref()
                .and_then(|s| s.log_level.clone())
                .unwrap_or(default.server.log_level),
        },
        broker: BrokerSettings {
            queue_capacity: partial
                .broker
                .as_ref()
                .and_then(|b| b.queue_capacity)
                .unwrap_or(default.broker.queue_capacity),
            heartbeat_timeout_secs: partial
                .broker
                .as_ref()
                .and_then(|b| b.heartbeat_timeout_secs)
                .unwrap_or(default.broker.heartbeat_timeout_secs),
            backpressure_policy: partial
                .broker
                .as_ref()
                .and_then(|b| b.backpressure_policy)
                .unwrap_or(default.broker.backpressure_policy),
            create_topic_on_publish: partial
                .broker
                .as_ref()
                .and_then(|b| b.create_topic_on_publish)
                .unwrap_or(default.broker.create_topic_on_publish),
            retain_empty_topics: partial
                .broker
                .as_ref()
                .and_then(|b| b.retain_empty_topics)
                .unwrap_or(default.broker.retain_empty_topics),
            max_send_retries: partial
                .broker
                .as_ref()
                .and_then(|b| b.max_send_retries)
                .unwrap_or(default.broker.max_send_retries),
        },
    })
}

#[cfg(test)]
mod tests;
