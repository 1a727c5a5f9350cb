//! Command routing for the gateway
//!
//! This module handles:
//! - Looking up the topic of each control message
//! - Validating payloads into typed requests
//! - Executing requests on the gateway's own hardware
//! - Encoding requests addressed to peers and handing them to the radio

pub mod handlers;
mod router;
pub mod topic;

#[cfg(test)]
pub(crate) mod testing;

pub use router::{CommandRouter, RejectReason, RouterOutcome};

use meshgate_shared::{ControlMessage, DeviceAddress, Payload};

/// A control message with its target resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub target: DeviceAddress,
    pub topic: String,
    pub payload: Payload,
}

impl Command {
    /// Gateway-level messages carry no address and target the gateway itself
    pub fn from_message(message: ControlMessage, own_address: DeviceAddress) -> Self {
        Self {
            target: message.address.unwrap_or(own_address),
            topic: message.topic,
            payload: message.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_message() {
        let own = DeviceAddress::new(0xa);
        let message = ControlMessage {
            address: None,
            topic: "/info/get".into(),
            payload: Payload::Null,
        };
        assert_eq!(Command::from_message(message, own).target, own);

        let peer = DeviceAddress::new(0xb);
        let message = ControlMessage {
            address: Some(peer),
            topic: "led/-/state/get".into(),
            payload: Payload::Null,
        };
        let command = Command::from_message(message, own);
        assert_eq!(command.target, peer);
        assert_eq!(command.topic, "led/-/state/get");
    }
}
