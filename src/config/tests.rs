use super::settings::Settings;
use crate::broker::queue::BackpressurePolicy;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.server.log_level, "info");
    assert_eq!(settings.broker.queue_capacity, 64);
    assert_eq!(settings.broker.heartbeat_timeout_secs, 30);
    assert_eq!(
        settings.broker.backpressure_policy,
        BackpressurePolicy::DisconnectSubscriber
    );
    assert!(settings.broker.create_topic_on_publish);
    assert!(!settings.broker.retain_empty_topics);
    assert_eq!(settings.broker.max_send_retries, 3);
}

#[test]
fn test_backpressure_policy_parses_from_snake_case() {
    let policy: BackpressurePolicy = serde_json::from_str("\"drop_oldest\"").unwrap();
    assert_eq!(policy, BackpressurePolicy::DropOldest);
    let policy: BackpressurePolicy = serde_json::from_str("\"disconnect_subscriber\"").unwrap();
    assert_eq!(policy, BackpressurePolicy::DisconnectSubscriber);
}
