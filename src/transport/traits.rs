//! Transport trait abstraction for the control link and the radio

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use meshgate_shared::{DeviceAddress, Event};
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

/// A control link stream that can read and write bytes
#[async_trait]
pub trait ControlStream: AsyncRead + AsyncWrite + Send + Unpin + 'static {
    /// Close the link gracefully
    async fn shutdown(&mut self) -> Result<()>;
}

/// Factory for control link connections
#[async_trait]
pub trait ControlConnector: Send + Sync {
    /// The stream type this connector produces
    type Stream: ControlStream;

    /// Attempt to connect, returning a stream on success
    async fn connect(&self) -> Result<Self::Stream>;

    /// Human-readable name for this link
    fn name(&self) -> &'static str;
}

/// Where events and gateway notifications go
pub trait ControlSurface {
    /// Publish an event under `<source>/<topic>`
    fn publish(&mut self, event: &Event);

    /// Publish a gateway-level message such as `/info` or `/attach`
    fn notify(&mut self, topic: &str, payload: Value);
}

/// Something that happened on the radio
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioEvent {
    /// Frame received from a peer
    Frame { source: DeviceAddress, payload: Bytes },
    /// A peer asked to join
    Attached(DeviceAddress),
    /// A peer left
    Detached(DeviceAddress),
    /// Radio initialised with this address
    Ready(DeviceAddress),
}

#[derive(Error, Debug)]
pub enum RadioError {
    #[error("no route to {0}")]
    NoRoute(DeviceAddress),

    #[error("radio I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outbound half of the radio plus its peer table.
///
/// `send` is fire-and-forget: delivery is not confirmed.
pub trait RadioLink {
    fn send(&mut self, target: DeviceAddress, frame: &[u8]) -> Result<(), RadioError>;

    /// Enrolled peers in address order
    fn peers(&self) -> Vec<DeviceAddress>;

    /// Returns `false` if the peer was already enrolled
    fn add_peer(&mut self, peer: DeviceAddress) -> bool;

    /// Returns `false` if the peer was not enrolled
    fn remove_peer(&mut self, peer: DeviceAddress) -> bool;

    /// Remove every peer, returning those removed
    fn purge_peers(&mut self) -> Vec<DeviceAddress>;
}
