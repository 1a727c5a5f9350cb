//! Gateway configuration
//!
//! [`GatewayConfig`] carries defaults suitable for a gateway on a USB CDC
//! port; [`Args`] overrides them from the command line.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use meshgate_shared::DeviceAddress;

/// How the controller reaches the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlLinkConfig {
    /// USB CDC / UART port (e.g., "/dev/ttyACM0")
    Serial { port: String, baud: u32 },
    /// TCP server the gateway dials (for development)
    Tcp { address: String },
}

impl Default for ControlLinkConfig {
    fn default() -> Self {
        Self::Serial {
            port: "/dev/ttyACM0".into(),
            baud: 115_200,
        }
    }
}

/// Known UDP endpoint of a simulated peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerRoute {
    pub address: DeviceAddress,
    pub endpoint: SocketAddr,
}

/// Parse `<address>=<host:port>`
pub fn parse_peer_route(text: &str) -> Result<PeerRoute, String> {
    let (address, endpoint) = text
        .split_once('=')
        .ok_or_else(|| format!("expected <address>=<host:port>, got {text:?}"))?;
    Ok(PeerRoute {
        address: address.parse().map_err(|e| format!("{e}"))?,
        endpoint: endpoint
            .parse()
            .map_err(|e| format!("invalid endpoint {endpoint:?}: {e}"))?,
    })
}

/// Simulated radio link
#[derive(Debug, Clone)]
pub struct RadioConfig {
    /// UDP address the radio listens on
    pub bind: String,
    /// Address the radio reports once it is ready
    pub address: DeviceAddress,
    /// Peers reachable before they send anything
    pub peers: Vec<PeerRoute>,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7700".into(),
            address: DeviceAddress::new(0x0000_0000_0001),
            peers: Vec::new(),
        }
    }
}

/// Configuration for the gateway process
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub control: ControlLinkConfig,
    pub radio: RadioConfig,
    /// Reported by `/info/get`
    pub firmware: String,
    /// Reconnection delay (initial)
    pub reconnect_delay: Duration,
    /// Maximum reconnection delay
    pub max_reconnect_delay: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Period of the statistics log line
    pub stats_interval: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            control: ControlLinkConfig::default(),
            radio: RadioConfig::default(),
            firmware: concat!("usb-gateway-", env!("CARGO_PKG_VERSION")).into(),
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            stats_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "usb-gateway", about = "JSON control link to radio mesh gateway")]
pub struct Args {
    /// Serial port of the control link
    #[arg(long, conflicts_with = "tcp")]
    pub serial: Option<String>,
    #[arg(long, default_value_t = 115_200)]
    pub baud: u32,
    /// Dial a TCP controller instead of a serial port
    #[arg(long)]
    pub tcp: Option<String>,
    #[arg(long, default_value = "127.0.0.1:7700")]
    pub radio_bind: String,
    /// Own radio address, twelve hex digits
    #[arg(long)]
    pub address: Option<DeviceAddress>,
    /// Static peer endpoint, `<address>=<host:port>`; repeatable
    #[arg(long = "peer", value_parser = parse_peer_route)]
    pub peers: Vec<PeerRoute>,
    #[arg(long, default_value_t = 60)]
    pub stats_interval_secs: u64,
}

impl Args {
    pub fn into_config(self) -> GatewayConfig {
        let defaults = GatewayConfig::default();

        let control = match (self.serial, self.tcp) {
            (Some(port), _) => ControlLinkConfig::Serial {
                port,
                baud: self.baud,
            },
            (None, Some(address)) => ControlLinkConfig::Tcp { address },
            (None, None) => defaults.control,
        };

        GatewayConfig {
            control,
            radio: RadioConfig {
                bind: self.radio_bind,
                address: self.address.unwrap_or(defaults.radio.address),
                peers: self.peers,
            },
            stats_interval: Duration::from_secs(self.stats_interval_secs.max(1)),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(matches!(config.control, ControlLinkConfig::Serial { baud: 115_200, .. }));
        assert!(config.max_reconnect_delay > config.reconnect_delay);
        assert!(config.firmware.starts_with("usb-gateway-"));
    }

    #[test]
    fn test_args_override_defaults() {
        let args = Args::parse_from([
            "usb-gateway",
            "--tcp",
            "127.0.0.1:7701",
            "--address",
            "0000000000aa",
            "--peer",
            "0000000000bb=127.0.0.1:7800",
        ]);
        let config = args.into_config();

        assert_eq!(
            config.control,
            ControlLinkConfig::Tcp {
                address: "127.0.0.1:7701".into()
            }
        );
        assert_eq!(config.radio.address, DeviceAddress::new(0xaa));
        assert_eq!(config.radio.peers.len(), 1);
        assert_eq!(config.radio.peers[0].address, DeviceAddress::new(0xbb));
    }

    #[test]
    fn test_serial_args() {
        let config = Args::parse_from(["usb-gateway", "--serial", "/dev/ttyUSB1", "--baud", "9600"])
            .into_config();
        assert_eq!(
            config.control,
            ControlLinkConfig::Serial {
                port: "/dev/ttyUSB1".into(),
                baud: 9600
            }
        );
    }

    #[test]
    fn test_parse_peer_route() {
        assert!(parse_peer_route("0000000000bb=127.0.0.1:7800").is_ok());
        assert!(parse_peer_route("0000000000bb").is_err());
        assert!(parse_peer_route("bb=127.0.0.1:7800").is_err());
        assert!(parse_peer_route("0000000000bb=nowhere").is_err());
    }
}
