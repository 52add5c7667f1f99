use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, Stream, StreamExt};
use serde_json::json;
use tokio_tungstenite::connect_async;
use tungstenite::protocol::Message as WsMessage;

use crate::broker::Broker;
use crate::config::BrokerSettings;
use crate::transport::websocket::start_websocket_server;

async fn expect_event(
    ws: &mut (impl Stream<Item = Result<WsMessage, tungstenite::Error>> + Unpin),
) -> serde_json::Value {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let frame = ws
                .next()
                .await
                .expect("connection closed")
                .expect("websocket error");
            match frame {
                WsMessage::Text(text) => {
                    return serde_json::from_str(&text).expect("event is JSON");
                }
                // Keepalive traffic is not part of the event stream.
                WsMessage::Ping(_) | WsMessage::Pong(_) => {}
                other => panic!("expected a text frame, got {:?}", other),
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

#[tokio::test]
async fn integration_fanout_end_to_end() {
    let broker = Arc::new(Broker::default());
    let addr = "127.0.0.1:9011";

    let server_broker = broker.clone();
    tokio::spawn(async move {
        start_websocket_server(addr, server_broker).await;
    });
    tokio::time::sleep(Duration::from_millis(300)).await;

    let url = format!("ws://{}", addr);
    let (mut ws_s1, _) = connect_async(url.as_str()).await.expect("S1 connect");
    let (mut ws_s2, _) = connect_async(url.as_str()).await.expect("S2 connect");
    let (mut ws_pub, _) = connect_async(url.as_str()).await.expect("publisher connect");

    let sub_msg = json!({ "type": "subscribe", "topic": "channels" }).to_string();
    ws_s1.send(WsMessage::text(sub_msg.clone())).await.unwrap();
    ws_s2.send(WsMessage::text(sub_msg)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let pub_msg = json!({
        "type": "publish",
        "topic": "channels",
        "payload": "hello"
    })
    .to_string();
    ws_pub.send(WsMessage::text(pub_msg)).await.unwrap();

    let event = expect_event(&mut ws_s1).await;
    assert_eq!(event["topic"], "channels");
    assert_eq!(event["seq"], 1);
    assert_eq!(event["payload"], "hello");

    let event = expect_event(&mut ws_s2).await;
    assert_eq!(event["seq"], 1);
    assert_eq!(event["payload"], "hello");

    // S1 leaves; only S2 should see the next event.
    let unsub_msg = json!({ "type": "unsubscribe", "topic": "channels" }).to_string();
    ws_s1.send(WsMessage::text(unsub_msg)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let pub_msg = json!({
        "type": "publish",
        "topic": "channels",
        "payload": "world"
    })
    .to_string();
    ws_pub.send(WsMessage::text(pub_msg)).await.unwrap();

    let event = expect_event(&mut ws_s2).await;
    assert_eq!(event["seq"], 2);
    assert_eq!(event["payload"], "world");

    let nothing = tokio::time::timeout(Duration::from_millis(300), ws_s1.next()).await;
    assert!(nothing.is_err(), "S1 received an event after unsubscribing");
}

#[tokio::test]
async fn integration_evicted_subscriber_cannot_resubscribe() {
    let broker = Arc::new(Broker::default());
    let addr = "127.0.0.1:9012";

    let server_broker = broker.clone();
    tokio::spawn(async move {
        start_websocket_server(addr, server_broker).await;
    });
    tokio::time::sleep(Duration::from_millis(300)).await;

    let url = format!("ws://{}", addr);
    let (mut ws, _) = connect_async(url.as_str()).await.expect("connect");
    let sub_msg = json!({ "type": "subscribe", "topic": "firehose" }).to_string();
    ws.send(WsMessage::text(sub_msg.clone())).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let id = broker
        .list_subscribers("firehose")
        .pop()
        .expect("subscriber registered");

    // Evict the subscriber the way overflow or the idle reaper would.
    broker.cleanup_subscriber(&id);

    // A stale subscribe from the evicted connection must not resurrect it.
    let _ = ws.send(WsMessage::text(sub_msg)).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(
        broker.list_subscribers("firehose").is_empty(),
        "evicted subscriber rejoined the topic"
    );

    // The server ends the connection instead of leaving it half-open.
    let closed = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "server left the evicted connection open");
}

#[tokio::test]
async fn integration_passive_listener_survives_heartbeat() {
    let broker = Arc::new(Broker::new(BrokerSettings {
        heartbeat_timeout_secs: 2,
        ..BrokerSettings::default()
    }));
    let addr = "127.0.0.1:9013";

    let server_broker = broker.clone();
    tokio::spawn(async move {
        start_websocket_server(addr, server_broker).await;
    });
    tokio::time::sleep(Duration::from_millis(300)).await;

    let url = format!("ws://{}", addr);
    let (mut ws, _) = connect_async(url.as_str()).await.expect("connect");
    let sub_msg = json!({ "type": "subscribe", "topic": "quiet" }).to_string();
    ws.send(WsMessage::text(sub_msg)).await.unwrap();

    // Listen without publishing for longer than the heartbeat timeout. The
    // client answers the server's pings simply by being polled.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    while tokio::time::Instant::now() < deadline {
        let _ = tokio::time::timeout(Duration::from_millis(250), ws.next()).await;
    }

    assert_eq!(
        broker.list_subscribers("quiet").len(),
        1,
        "idle listener was reaped despite a live connection"
    );
}
