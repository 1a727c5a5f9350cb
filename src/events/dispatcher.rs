use std::sync::Arc;

use meshgate_shared::{decode, DeviceAddress, Event, Frame};
use tracing::debug;

use crate::stats::{DropCause, GatewayStats};

/// Decodes peer frames into at most one event each
pub struct EventDispatcher {
    stats: Arc<GatewayStats>,
}

impl EventDispatcher {
    pub fn new(stats: Arc<GatewayStats>) -> Self {
        Self { stats }
    }

    /// Frames that fail to decode are dropped and counted by cause. Peers
    /// only report; a command frame from one is dropped as well.
    pub fn dispatch(&self, source: DeviceAddress, bytes: &[u8]) -> Option<Event> {
        match decode(bytes) {
            Ok(Frame::Telemetry(telemetry)) => Some(telemetry.into_event(source)),
            Ok(Frame::Command { target, request }) => {
                debug!(
                    "Dropping {:?} command for {} received from {}",
                    request.tag(),
                    target,
                    source
                );
                self.stats.frame_dropped(DropCause::UnexpectedCommand);
                None
            }
            Err(e) => {
                debug!("Dropping frame from {}: {}", source, e);
                self.stats.frame_dropped(DropCause::from(&e));
                None
            }
        }
    }
}
