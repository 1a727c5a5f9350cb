mod command;
mod config;
mod connection;
mod events;
mod hardware;
mod stats;
mod transport;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use command::handlers::HandlerContext;
use command::{Command, CommandRouter, RouterOutcome};
use config::{Args, ControlLinkConfig};
use connection::{ConnectionEvent, ConnectionManager, ControlPublisher};
use events::EventDispatcher;
use hardware::VirtualBoard;
use stats::GatewayStats;
use transport::{RadioEvent, SerialConnector, TcpConnector, UdpRadio};

use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

type Router = CommandRouter<VirtualBoard, UdpRadio, ControlPublisher>;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = Args::parse().into_config();

    info!("USB gateway starting: {}", config.firmware);
    let mut conn = match &config.control {
        ControlLinkConfig::Serial { port, baud } => {
            info!("  Control link: serial {} @ {} baud", port, baud);
            ConnectionManager::new(SerialConnector::new(port.as_str(), *baud), &config)
        }
        ControlLinkConfig::Tcp { address } => {
            info!("  Control link: tcp {}", address);
            ConnectionManager::new(TcpConnector::new(address.as_str()), &config)
        }
    };

    let (radio, mut radio_events) = UdpRadio::bind(&config.radio).await?;

    let stats = Arc::new(GatewayStats::new());
    let dispatcher = EventDispatcher::new(stats.clone());
    let mut router: Router = CommandRouter::new(
        HandlerContext::new(config.radio.address, config.firmware.clone()),
        VirtualBoard::new(),
        radio,
        conn.publisher(),
        stats.clone(),
    );

    // Spawn statistics ticker
    let stats_clone = stats.clone();
    let stats_interval = config.stats_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(stats_interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            info!("[STATS] {}", stats_clone.snapshot());
        }
    });

    // Main event loop
    loop {
        tokio::select! {
            event = conn.recv() => match event {
                Some(event) => handle_connection_event(event, &mut router, &stats),
                None => {
                    error!("Connection manager closed");
                    break;
                }
            },
            event = radio_events.recv() => match event {
                Some(event) => handle_radio_event(event, &mut router, &dispatcher),
                None => {
                    error!("[RADIO] Radio channel closed");
                    break;
                }
            },
        }
    }

    Ok(())
}

fn handle_connection_event(event: ConnectionEvent, router: &mut Router, stats: &GatewayStats) {
    match event {
        ConnectionEvent::Connected { link } => {
            info!("Controller connected via {}", link);
        }
        ConnectionEvent::Disconnected { reason } => {
            warn!("Controller disconnected: {}", reason);
        }
        ConnectionEvent::ConnectionFailed { reason } => {
            error!("Connection failed: {}", reason);
        }
        ConnectionEvent::Malformed { reason } => {
            warn!("Skipping control line: {}", reason);
            stats.line_malformed();
        }
        ConnectionEvent::Received(message) => {
            let command = Command::from_message(message, router.own_address());
            if let RouterOutcome::Executed = router.route(&command) {
                debug!("  {} executed on the gateway", command.topic);
            }
        }
    }
}

fn handle_radio_event(event: RadioEvent, router: &mut Router, dispatcher: &EventDispatcher) {
    match event {
        RadioEvent::Frame { source, payload } => {
            if let Some(event) = dispatcher.dispatch(source, &payload) {
                debug!("[RADIO] {}", event.wire_topic());
                router.publish(&event);
            }
        }
        RadioEvent::Attached(peer) => router.peer_attached(peer),
        RadioEvent::Detached(peer) => router.peer_detached(peer),
        RadioEvent::Ready(address) => {
            info!("[RADIO] Ready as {}", address);
            router.set_own_address(address);
        }
    }
}
