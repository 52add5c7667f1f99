use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::accept_async;
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::Broker;
use crate::subscriber::Subscriber;
use crate::transport::message::ClientMessage;

pub async fn start_websocket_server(addr: &str, broker: Arc<Broker>) {
    let listener = TcpListener::bind(addr).await.expect("Can't bind");

    info!("WebSocket server listening on ws://{}", addr);

    tokio::spawn(reap_idle_subscribers(broker.clone()));

    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(handle_connection(stream, broker.clone()));
    }
}

/// Periodically evicts subscribers whose connections have gone silent for
/// longer than the heartbeat timeout.
async fn reap_idle_subscribers(broker: Arc<Broker>) {
    let period = Duration::from_secs((broker.settings().heartbeat_timeout_secs / 2).max(1));
    loop {
        tokio::time::sleep(period).await;
        broker.reap_idle();
    }
}

/// Sends one frame, retrying a bounded number of times. Returns the last
/// error once the retry budget is exhausted.
pub(crate) async fn send_with_retries<S>(
    sink: &mut S,
    frame: WsMessage,
    max_retries: u8,
) -> Result<(), S::Error>
where
    S: Sink<WsMessage> + Unpin,
{
    let mut attempts: u32 = 0;
    loop {
        match sink.send(frame.clone()).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                attempts += 1;
                if attempts > u32::from(max_retries) {
                    return Err(e);
                }
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, broker: Arc<Broker>) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake error: {}", e);
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let subscriber = Arc::new(Subscriber::new(broker.settings().queue_capacity));
    let subscriber_id = subscriber.id.clone();

    // Register before anything else so published events can reach this
    // connection as soon as it subscribes.
    broker.register_subscriber(subscriber.clone());
    info!("{} connected", subscriber_id);

    // Forward events from the outbound queue to the socket. Single consumer
    // per connection, so per-topic order survives. Between events the task
    // pings the peer; the auto-pong arrives in the read loop and refreshes
    // the heartbeat, so a subscriber that only listens stays alive.
    let queue = subscriber.queue.clone();
    let max_retries = broker.settings().max_send_retries;
    let ping_period = Duration::from_secs((broker.settings().heartbeat_timeout_secs / 2).max(1));
    let send_broker = broker.clone();
    let send_id = subscriber_id.clone();
    tokio::spawn(async move {
        let mut ping = tokio::time::interval(ping_period);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                maybe_event = queue.pop() => {
                    let Some(event) = maybe_event else { break };
                    let text = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(e) => {
                            error!("Failed to serialize event: {:?}", e);
                            continue;
                        }
                    };
                    if let Err(e) = send_with_retries(&mut ws_sender, WsMessage::text(text), max_retries).await {
                        warn!("Giving up on {} after repeated send failures: {}", send_id, e);
                        break;
                    }
                }
                _ = ping.tick() => {
                    if ws_sender.send(WsMessage::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
        // Tell the peer the server side is done before dropping the sink, so
        // an evicted client sees a close instead of a silent half-open socket.
        let _ = ws_sender.send(WsMessage::Close(None)).await;
        send_broker.cleanup_subscriber(&send_id);
        debug!("Send loop closed for {}", send_id);
    });

    // Handle incoming frames. Any frame counts as a heartbeat.
    while let Some(Ok(msg)) = ws_receiver.next().await {
        if subscriber.queue.is_closed() {
            // Evicted elsewhere (queue overflow or the idle reaper); stop
            // serving this connection so a stale frame cannot resurrect the id.
            break;
        }
        subscriber.touch();
        match msg {
            WsMessage::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Subscribe { topic }) => {
                    broker.subscribe(&topic, subscriber_id.clone());
                    if subscriber.queue.is_closed() {
                        // Eviction raced with the subscribe; undo it.
                        broker.unsubscribe(&topic, &subscriber_id);
                        break;
                    }
                    info!("{} subscribed to {}", subscriber_id, topic);
                }

                Ok(ClientMessage::Unsubscribe { topic }) => {
                    broker.unsubscribe(&topic, &subscriber_id);
                    info!("{} unsubscribed from {}", subscriber_id, topic);
                }

                Ok(ClientMessage::Publish { topic, payload }) => {
                    match broker.publish(&topic, payload) {
                        Ok(seq) => {
                            info!("{} published seq={} to {}", subscriber_id, seq, topic);
                        }
                        Err(e) => {
                            warn!("{} publish rejected: {}", subscriber_id, e);
                        }
                    }
                }

                Err(err) => {
                    warn!("Invalid client message: {} | {}", err, text);
                }
            },
            WsMessage::Close(_) => break,
            // Ping/pong and binary frames only refresh the heartbeat.
            _ => {}
        }
    }

    info!("{} disconnected", subscriber_id);
    broker.cleanup_subscriber(&subscriber_id);
}
