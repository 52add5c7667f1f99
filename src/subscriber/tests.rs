use super::Subscriber;

#[test]
fn test_subscriber_new_has_unique_id() {
    let a = Subscriber::new(8);
    let b = Subscriber::new(8);
    assert!(!a.id.is_empty());
    assert_ne!(a.id, b.id);
}

#[test]
fn test_touch_resets_idle_time() {
    let subscriber = Subscriber::new(8);
    std::thread::sleep(std::time::Duration::from_millis(15));
    assert!(subscriber.idle_ms() >= 10);

    subscriber.touch();
    assert!(subscriber.idle_ms() < 10);
}
