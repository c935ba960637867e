use super::*;

#[tokio::test]
async fn subscriber_receives_values_in_order() {
    let hub = Broadcast::new();
    let mut sub = hub.subscribe();
    hub.publish(1);
    hub.publish(2);
    hub.publish(3);
    assert_eq!(sub.recv().await, Some(1));
    assert_eq!(sub.recv().await, Some(2));
    assert_eq!(sub.recv().await, Some(3));
}

#[test]
fn late_subscriber_gets_latest_only() {
    let hub = Broadcast::new();
    hub.publish("a");
    hub.publish("b");
    let mut sub = hub.subscribe();
    assert_eq!(sub.try_recv(), Some("b"));
    assert_eq!(sub.try_recv(), None);
}

#[test]
fn with_latest_replays_initial_value() {
    let hub = Broadcast::with_latest(7);
    let mut sub = hub.subscribe();
    assert_eq!(sub.try_recv(), Some(7));
    assert_eq!(hub.latest(), Some(7));
}

#[test]
fn dropping_subscription_unsubscribes() {
    let hub: Broadcast<u8> = Broadcast::new();
    let a = hub.subscribe();
    let b = hub.subscribe();
    assert_eq!(hub.subscriber_count(), 2);
    drop(a);
    assert_eq!(hub.subscriber_count(), 1);
    drop(b);
    assert_eq!(hub.subscriber_count(), 0);
}

#[test]
fn publish_changed_skips_duplicates() {
    let hub = Broadcast::new();
    let mut sub = hub.subscribe();
    assert!(hub.publish_changed(1));
    assert!(!hub.publish_changed(1));
    assert!(hub.publish_changed(2));
    assert_eq!(sub.try_recv(), Some(1));
    assert_eq!(sub.try_recv(), Some(2));
    assert_eq!(sub.try_recv(), None);
}

#[tokio::test]
async fn close_ends_subscriptions() {
    let hub = Broadcast::new();
    let mut sub = hub.subscribe();
    hub.publish(1);
    hub.close();
    hub.publish(2);
    assert_eq!(sub.recv().await, Some(1));
    assert_eq!(sub.recv().await, None);

    let mut late = hub.subscribe();
    assert_eq!(late.recv().await, None);
}

#[tokio::test]
async fn dropping_hub_ends_subscriptions() {
    let hub: Broadcast<u8> = Broadcast::new();
    let mut sub = hub.subscribe();
    drop(hub);
    assert_eq!(sub.recv().await, None);
}
