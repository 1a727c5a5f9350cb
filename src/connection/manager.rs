//! Connection manager with persistent connections and automatic reconnection

use anyhow::{anyhow, Result};
use meshgate_shared::line::{format_event, format_notify};
use meshgate_shared::{ControlMessage, Event, LineDecoder};
use serde_json::Value;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::transport::{ControlConnector, ControlStream, ControlSurface};

/// Lines waiting to be written to the controller
const OUTBOUND_CAPACITY: usize = 256;

/// Events emitted by the connection manager
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// Control link is up
    Connected { link: &'static str },
    /// Control link dropped
    Disconnected { reason: String },
    /// Received a control message
    Received(ControlMessage),
    /// A line could not be parsed; it has been skipped
    Malformed { reason: String },
    /// Connection attempt failed, will retry
    ConnectionFailed { reason: String },
}

#[derive(Debug, Clone, Copy)]
struct Backoff {
    reconnect_delay: Duration,
    max_reconnect_delay: Duration,
    connect_timeout: Duration,
}

/// Manages the persistent control link
pub struct ConnectionManager {
    /// Channel to send lines to the controller
    outbound_tx: mpsc::Sender<String>,
    /// Channel to receive connection events
    event_rx: mpsc::Receiver<ConnectionEvent>,
}

impl ConnectionManager {
    /// Create a new connection manager and start the connection loop
    pub fn new<C>(connector: C, config: &GatewayConfig) -> Self
    where
        C: ControlConnector + 'static,
    {
        let (outbound_tx, outbound_rx) = mpsc::channel::<String>(OUTBOUND_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel::<ConnectionEvent>(100);

        let backoff = Backoff {
            reconnect_delay: config.reconnect_delay,
            max_reconnect_delay: config.max_reconnect_delay,
            connect_timeout: config.connect_timeout,
        };
        tokio::spawn(async move {
            connection_loop(connector, backoff, outbound_rx, event_tx).await;
        });

        Self {
            outbound_tx,
            event_rx,
        }
    }

    /// Receive the next connection event
    pub async fn recv(&mut self) -> Option<ConnectionEvent> {
        self.event_rx.recv().await
    }

    /// Control surface writing to this link
    pub fn publisher(&self) -> ControlPublisher {
        ControlPublisher {
            outbound_tx: self.outbound_tx.clone(),
        }
    }
}

/// Formats events as control lines and queues them for the link.
///
/// Lines queued while the link is down are written once it is back; when
/// the queue is full, lines are dropped.
#[derive(Debug, Clone)]
pub struct ControlPublisher {
    outbound_tx: mpsc::Sender<String>,
}

impl ControlPublisher {
    fn queue(&self, line: String) {
        if let Err(e) = self.outbound_tx.try_send(line) {
            warn!("Dropping control line: {}", e);
        }
    }
}

impl ControlSurface for ControlPublisher {
    fn publish(&mut self, event: &Event) {
        self.queue(format_event(event));
    }

    fn notify(&mut self, topic: &str, payload: Value) {
        self.queue(format_notify(topic, payload));
    }
}

/// Main connection loop with reconnection logic
async fn connection_loop<C: ControlConnector>(
    connector: C,
    backoff: Backoff,
    mut outbound_rx: mpsc::Receiver<String>,
    event_tx: mpsc::Sender<ConnectionEvent>,
) {
    let mut reconnect_delay = backoff.reconnect_delay;

    loop {
        match timeout(backoff.connect_timeout, connector.connect()).await {
            Ok(Ok(mut stream)) => {
                reconnect_delay = backoff.reconnect_delay;

                if event_tx
                    .send(ConnectionEvent::Connected {
                        link: connector.name(),
                    })
                    .await
                    .is_err()
                {
                    return;
                }

                let result = handle_connection(&mut stream, &mut outbound_rx, &event_tx).await;
                let _ = ControlStream::shutdown(&mut stream).await;
                if let Err(reason) = result {
                    let _ = event_tx
                        .send(ConnectionEvent::Disconnected {
                            reason: reason.to_string(),
                        })
                        .await;
                }
            }
            Ok(Err(e)) => {
                let _ = event_tx
                    .send(ConnectionEvent::ConnectionFailed {
                        reason: format!("{} link: {:#}", connector.name(), e),
                    })
                    .await;
            }
            Err(_) => {
                let _ = event_tx
                    .send(ConnectionEvent::ConnectionFailed {
                        reason: format!("{} link: connect timed out", connector.name()),
                    })
                    .await;
            }
        }

        if event_tx.is_closed() {
            debug!("Connection event channel closed, stopping");
            return;
        }

        // Wait before reconnecting
        tokio::time::sleep(reconnect_delay).await;

        // Exponential backoff
        reconnect_delay = std::cmp::min(reconnect_delay * 2, backoff.max_reconnect_delay);
    }
}

/// Handle an active connection
async fn handle_connection<S: ControlStream>(
    stream: &mut S,
    outbound_rx: &mut mpsc::Receiver<String>,
    event_tx: &mpsc::Sender<ConnectionEvent>,
) -> Result<()> {
    let (mut reader, mut writer) = tokio::io::split(stream);

    let mut decoder = LineDecoder::new();
    let mut read_buf = vec![0u8; 1024];

    loop {
        tokio::select! {
            // Send outbound lines
            Some(line) = outbound_rx.recv() => {
                writer.write_all(line.as_bytes()).await?;
                writer.flush().await?;
            }

            // Read incoming lines
            result = reader.read(&mut read_buf) => {
                let n = result.map_err(|e| anyhow!("Read error: {}", e))?;
                if n == 0 {
                    return Err(anyhow!("Controller closed the link"));
                }
                decoder.extend(&read_buf[..n]);

                // Process all complete lines
                loop {
                    let event = match decoder.decode_next() {
                        Ok(Some(message)) => ConnectionEvent::Received(message),
                        Ok(None) => break,
                        Err(e) => ConnectionEvent::Malformed {
                            reason: e.to_string(),
                        },
                    };
                    if event_tx.send(event).await.is_err() {
                        return Ok(());
                    }
                }
            }
        }
    }
}
