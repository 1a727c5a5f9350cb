//! Command router - decides where each command runs

use std::sync::Arc;

use meshgate_shared::{
    encode, AddressError, DeviceAddress, Event, Frame, MessageTag, Request, ValidationError,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::handlers::{self, HandlerContext};
use super::topic::{Action, TopicTable};
use super::Command;
use crate::hardware::Hardware;
use crate::stats::GatewayStats;
use crate::transport::{ControlSurface, RadioError, RadioLink};

/// Result of routing one command
#[derive(Debug)]
pub enum RouterOutcome {
    /// Applied to the gateway itself
    Executed,
    /// Encoded and handed to the radio. `frames` counts those actually
    /// sent, which is fewer than encoded if the radio failed part way.
    Forwarded { frames: usize },
    /// Refused; nothing was sent and nothing changed
    Rejected(RejectReason),
}

#[derive(Error, Debug)]
pub enum RejectReason {
    #[error("unknown topic {0:?}")]
    UnknownTopic(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{0:?} is not available on the gateway")]
    NotSupportedLocally(MessageTag),

    #[error("{0:?} is handled by the gateway only")]
    GatewayOnly(String),

    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    #[error(transparent)]
    Radio(#[from] RadioError),
}

/// Routes commands to the local hardware or to a peer over the radio
pub struct CommandRouter<H, R, C> {
    ctx: HandlerContext,
    table: TopicTable,
    hardware: H,
    radio: R,
    surface: C,
    stats: Arc<GatewayStats>,
}

impl<H, R, C> CommandRouter<H, R, C>
where
    H: Hardware,
    R: RadioLink,
    C: ControlSurface,
{
    pub fn new(
        ctx: HandlerContext,
        hardware: H,
        radio: R,
        surface: C,
        stats: Arc<GatewayStats>,
    ) -> Self {
        Self {
            ctx,
            table: TopicTable,
            hardware,
            radio,
            surface,
            stats,
        }
    }

    pub fn own_address(&self) -> DeviceAddress {
        self.ctx.own_address
    }

    /// Called once the radio reports its address
    pub fn set_own_address(&mut self, address: DeviceAddress) {
        if address != self.ctx.own_address {
            info!("Gateway address is now {}", address);
        }
        self.ctx.own_address = address;
    }

    #[cfg(test)]
    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    #[cfg(test)]
    pub fn radio(&self) -> &R {
        &self.radio
    }

    #[cfg(test)]
    pub fn surface(&self) -> &C {
        &self.surface
    }

    /// Route a command and count the outcome
    pub fn route(&mut self, command: &Command) -> RouterOutcome {
        debug!("Routing {} to {}", command.topic, command.target);

        let outcome = match self.try_route(command) {
            Ok(outcome) => outcome,
            Err(reason) => RouterOutcome::Rejected(reason),
        };

        match &outcome {
            RouterOutcome::Executed => self.stats.command_executed(),
            RouterOutcome::Forwarded { frames } => {
                debug!("  Forwarded as {} frame(s)", frames);
                self.stats.command_forwarded();
            }
            RouterOutcome::Rejected(reason) => {
                warn!("Command {} for {} rejected: {}", command.topic, command.target, reason);
                self.stats.command_rejected();
            }
        }
        outcome
    }

    fn try_route(&mut self, command: &Command) -> Result<RouterOutcome, RejectReason> {
        let action = self
            .table
            .lookup(&command.topic)
            .ok_or_else(|| RejectReason::UnknownTopic(command.topic.clone()))?;

        match action {
            Action::Gateway(action) => {
                if command.target != self.ctx.own_address {
                    return Err(RejectReason::GatewayOnly(command.topic.clone()));
                }
                handlers::handle_gateway(
                    &self.ctx,
                    action,
                    &command.payload,
                    &mut self.radio,
                    &mut self.surface,
                )?;
                Ok(RouterOutcome::Executed)
            }
            Action::Device(action) => {
                let requests = handlers::build_requests(action, &command.payload)?;
                if command.target == self.ctx.own_address {
                    self.execute_local(requests)?;
                    Ok(RouterOutcome::Executed)
                } else {
                    let frames = self.forward(command.target, requests)?;
                    Ok(RouterOutcome::Forwarded { frames })
                }
            }
        }
    }

    fn execute_local(&mut self, requests: Vec<Request>) -> Result<(), RejectReason> {
        for request in requests {
            let report = handlers::execute_local(&mut self.ctx, &mut self.hardware, request)?;
            if let Some(telemetry) = report {
                let event = telemetry.into_event(self.ctx.own_address);
                self.publish(&event);
            }
        }
        Ok(())
    }

    fn forward(
        &mut self,
        target: DeviceAddress,
        requests: Vec<Request>,
    ) -> Result<usize, RejectReason> {
        let total = requests.len();
        let mut sent = 0;
        for request in requests {
            let frame = encode(&Frame::command(target, request));
            if let Err(e) = self.radio.send(target, &frame) {
                // frames already on air cannot be recalled
                if sent == 0 {
                    return Err(e.into());
                }
                warn!(
                    "Only {} of {} frames reached the radio for {}: {}",
                    sent, total, target, e
                );
                break;
            }
            sent += 1;
            self.stats.frame_sent();
        }
        Ok(sent)
    }

    /// Hand an event to the control surface
    pub fn publish(&mut self, event: &Event) {
        self.surface.publish(event);
        self.stats.event_published();
    }

    pub fn peer_attached(&mut self, peer: DeviceAddress) {
        if self.radio.add_peer(peer) {
            info!("Peer {} attached", peer);
        }
        handlers::notify_attach(&mut self.surface, peer);
    }

    pub fn peer_detached(&mut self, peer: DeviceAddress) {
        if self.radio.remove_peer(peer) {
            info!("Peer {} detached", peer);
        }
        handlers::notify_detach(&mut self.surface, peer);
    }
}
