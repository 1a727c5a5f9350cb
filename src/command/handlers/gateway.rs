//! Gateway-level topics: identity and the radio peer table

use meshgate_shared::{DeviceAddress, Payload};
use serde_json::{json, Value};
use tracing::info;

use super::HandlerContext;
use crate::command::topic::GatewayAction;
use crate::command::RejectReason;
use crate::transport::{ControlSurface, RadioLink};

pub fn handle_gateway<R: RadioLink, C: ControlSurface>(
    ctx: &HandlerContext,
    action: GatewayAction,
    payload: &Payload,
    radio: &mut R,
    surface: &mut C,
) -> Result<(), RejectReason> {
    match action {
        GatewayAction::InfoGet => {
            surface.notify(
                "/info",
                json!({
                    "address": ctx.own_address.to_string(),
                    "firmware": ctx.firmware,
                }),
            );
        }
        GatewayAction::NodesGet => {
            let nodes: Vec<Value> = radio
                .peers()
                .into_iter()
                .map(|peer| Value::String(peer.to_string()))
                .collect();
            surface.notify("/nodes", Value::Array(nodes));
        }
        GatewayAction::NodesAdd => {
            let peer = parse_address(payload)?;
            if radio.add_peer(peer) {
                info!("Peer {} enrolled", peer);
                notify_attach(surface, peer);
            }
        }
        GatewayAction::NodesRemove => {
            let peer = parse_address(payload)?;
            if radio.remove_peer(peer) {
                info!("Peer {} removed", peer);
                notify_detach(surface, peer);
            }
        }
        GatewayAction::NodesPurge => {
            let removed = radio.purge_peers();
            info!("Purged {} peers", removed.len());
            for peer in removed {
                notify_detach(surface, peer);
            }
        }
    }
    Ok(())
}

pub fn notify_attach<C: ControlSurface>(surface: &mut C, peer: DeviceAddress) {
    surface.notify("/attach", Value::String(peer.to_string()));
}

pub fn notify_detach<C: ControlSurface>(surface: &mut C, peer: DeviceAddress) {
    surface.notify("/detach", Value::String(peer.to_string()));
}

fn parse_address(payload: &Payload) -> Result<DeviceAddress, RejectReason> {
    Ok(payload.as_str("address")?.parse()?)
}
