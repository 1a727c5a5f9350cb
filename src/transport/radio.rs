//! Radio link simulated over UDP
//!
//! Every datagram is:
//! ```text
//! [ 8 bytes: sender address, LE ][ radio frame ]
//! ```
//! An address-only datagram announces a peer, an address followed by a
//! single `0x00` withdraws it. Peer endpoints are learned from the datagrams
//! they send or configured up front.

use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context as _, Result};
use bytes::{BufMut, Bytes, BytesMut};
use meshgate_shared::tag::ADDRESS_LEN;
use meshgate_shared::DeviceAddress;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::RadioConfig;
use crate::transport::traits::{RadioError, RadioEvent, RadioLink};

/// Payload that marks a peer leaving the mesh
const DETACH_MARKER: u8 = 0x00;

/// Largest datagram accepted from a peer
const MAX_DATAGRAM: usize = 512;

type Routes = Arc<Mutex<HashMap<DeviceAddress, SocketAddr>>>;

pub struct UdpRadio {
    socket: Arc<UdpSocket>,
    address: DeviceAddress,
    peers: BTreeSet<DeviceAddress>,
    routes: Routes,
}

impl UdpRadio {
    /// Bind the socket and start the receive loop.
    ///
    /// The first event on the returned channel is always `Ready`.
    pub async fn bind(config: &RadioConfig) -> Result<(Self, mpsc::Receiver<RadioEvent>)> {
        let socket = UdpSocket::bind(&config.bind)
            .await
            .with_context(|| format!("binding radio socket {}", config.bind))?;
        let socket = Arc::new(socket);
        info!(
            "Radio simulation on {} as {}",
            socket.local_addr()?,
            config.address
        );

        let routes: Routes = Arc::new(Mutex::new(
            config
                .peers
                .iter()
                .map(|route| (route.address, route.endpoint))
                .collect(),
        ));

        let (event_tx, event_rx) = mpsc::channel::<RadioEvent>(100);
        event_tx
            .send(RadioEvent::Ready(config.address))
            .await
            .context("radio event channel closed")?;

        let socket_clone = socket.clone();
        let routes_clone = routes.clone();
        tokio::spawn(async move {
            receive_loop(socket_clone, routes_clone, event_tx).await;
        });

        Ok((
            Self {
                socket,
                address: config.address,
                peers: BTreeSet::new(),
                routes,
            },
            event_rx,
        ))
    }

    #[cfg(test)]
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

impl RadioLink for UdpRadio {
    fn send(&mut self, target: DeviceAddress, frame: &[u8]) -> Result<(), RadioError> {
        let endpoint = self
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&target)
            .copied()
            .ok_or(RadioError::NoRoute(target))?;

        let mut datagram = BytesMut::with_capacity(ADDRESS_LEN + frame.len());
        datagram.put_u64_le(self.address.raw());
        datagram.put_slice(frame);
        self.socket.try_send_to(&datagram, endpoint)?;
        Ok(())
    }

    fn peers(&self) -> Vec<DeviceAddress> {
        self.peers.iter().copied().collect()
    }

    fn add_peer(&mut self, peer: DeviceAddress) -> bool {
        self.peers.insert(peer)
    }

    fn remove_peer(&mut self, peer: DeviceAddress) -> bool {
        self.peers.remove(&peer)
    }

    fn purge_peers(&mut self) -> Vec<DeviceAddress> {
        std::mem::take(&mut self.peers).into_iter().collect()
    }
}

/// Split a datagram into its sender and the event it carries
fn parse_datagram(datagram: &[u8]) -> Option<(DeviceAddress, RadioEvent)> {
    if datagram.len() < ADDRESS_LEN {
        return None;
    }
    let (address, frame) = datagram.split_at(ADDRESS_LEN);
    let mut raw = [0u8; ADDRESS_LEN];
    raw.copy_from_slice(address);
    let source = DeviceAddress::from_le_bytes(raw);

    let event = match frame {
        [] => RadioEvent::Attached(source),
        [DETACH_MARKER] => RadioEvent::Detached(source),
        _ => RadioEvent::Frame {
            source,
            payload: Bytes::copy_from_slice(frame),
        },
    };
    Some((source, event))
}

async fn receive_loop(socket: Arc<UdpSocket>, routes: Routes, event_tx: mpsc::Sender<RadioEvent>) {
    let mut buf = vec![0u8; MAX_DATAGRAM];

    loop {
        let (n, from) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                warn!("Radio receive error: {}", e);
                continue;
            }
        };

        let Some((source, event)) = parse_datagram(&buf[..n]) else {
            debug!("Runt datagram ({} bytes) from {}", n, from);
            continue;
        };

        routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source, from);

        if event_tx.send(event).await.is_err() {
            debug!("Radio event channel closed, stopping receive loop");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PeerRoute;

    const PEER: DeviceAddress = DeviceAddress::new(0x0000_0000_00bb);

    fn test_config() -> RadioConfig {
        RadioConfig {
            bind: "127.0.0.1:0".into(),
            address: DeviceAddress::new(0x0000_0000_00aa),
            peers: Vec::new(),
        }
    }

    #[test]
    fn test_parse_datagram() {
        let address = PEER.to_le_bytes();
        assert_eq!(
            parse_datagram(&address),
            Some((PEER, RadioEvent::Attached(PEER)))
        );

        let mut detach = address.to_vec();
        detach.push(DETACH_MARKER);
        assert_eq!(
            parse_datagram(&detach),
            Some((PEER, RadioEvent::Detached(PEER)))
        );

        let mut frame = address.to_vec();
        frame.extend_from_slice(&[0x40, 0x07, 0x00]);
        assert_eq!(
            parse_datagram(&frame),
            Some((
                PEER,
                RadioEvent::Frame {
                    source: PEER,
                    payload: Bytes::from_static(&[0x40, 0x07, 0x00])
                }
            ))
        );

        assert_eq!(parse_datagram(&[1, 2, 3]), None);
    }

    #[tokio::test]
    async fn test_peer_table() {
        let (mut radio, _events) = UdpRadio::bind(&test_config()).await.expect("bind");

        assert!(radio.add_peer(PEER));
        assert!(!radio.add_peer(PEER));
        assert!(radio.add_peer(DeviceAddress::new(0x01)));
        assert_eq!(radio.peers(), vec![DeviceAddress::new(0x01), PEER]);

        assert!(radio.remove_peer(PEER));
        assert!(!radio.remove_peer(PEER));
        assert_eq!(radio.purge_peers(), vec![DeviceAddress::new(0x01)]);
        assert!(radio.peers().is_empty());
    }

    #[tokio::test]
    async fn test_send_without_route() {
        let (mut radio, _events) = UdpRadio::bind(&test_config()).await.expect("bind");
        assert!(matches!(
            radio.send(PEER, &[0x12]),
            Err(RadioError::NoRoute(addr)) if addr == PEER
        ));
    }

    #[tokio::test]
    async fn test_exchange_with_peer() {
        let peer = UdpSocket::bind("127.0.0.1:0").await.expect("peer bind");
        let config = RadioConfig {
            peers: vec![PeerRoute {
                address: PEER,
                endpoint: peer.local_addr().expect("peer addr"),
            }],
            ..test_config()
        };
        let (mut radio, mut events) = UdpRadio::bind(&config).await.expect("bind");
        let gateway = radio.local_addr().expect("gateway addr");

        assert_eq!(
            events.recv().await,
            Some(RadioEvent::Ready(config.address))
        );

        // static route: the gateway can talk first
        radio.send(PEER, &[0x12, 0xaa]).expect("send");
        let mut buf = [0u8; 64];
        let (n, _) = peer.recv_from(&mut buf).await.expect("peer recv");
        assert_eq!(&buf[..8], &config.address.to_le_bytes());
        assert_eq!(&buf[8..n], &[0x12, 0xaa]);

        let mut datagram = PEER.to_le_bytes().to_vec();
        datagram.extend_from_slice(&[0x40, 0x07, 0x00]);
        peer.send_to(&datagram, gateway).await.expect("peer send");
        assert_eq!(
            events.recv().await,
            Some(RadioEvent::Frame {
                source: PEER,
                payload: Bytes::from_static(&[0x40, 0x07, 0x00]),
            })
        );
    }

    #[tokio::test]
    async fn test_route_learned_from_announce() {
        let (mut radio, mut events) = UdpRadio::bind(&test_config()).await.expect("bind");
        let gateway = radio.local_addr().expect("gateway addr");
        let _ready = events.recv().await;

        let peer = UdpSocket::bind("127.0.0.1:0").await.expect("peer bind");
        peer.send_to(&PEER.to_le_bytes(), gateway)
            .await
            .expect("announce");
        assert_eq!(events.recv().await, Some(RadioEvent::Attached(PEER)));

        radio.send(PEER, &[0x21]).expect("route learned");
        let mut buf = [0u8; 64];
        let (n, _) = peer.recv_from(&mut buf).await.expect("peer recv");
        assert_eq!(n, 9);
    }
}
