use std::sync::Arc;

use fanout::broker::Broker;
use fanout::config::load_config;
use fanout::transport::websocket::start_websocket_server;
use fanout::utils::logging;

#[tokio::main]
async fn main() {
    let config = load_config().expect("Failed to load configuration");
    logging::init(&config.server.log_level);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let broker = Arc::new(Broker::new(config.broker.clone()));
    start_websocket_server(&addr, broker).await;
}
