//! Recording collaborators for router and handler tests

use std::collections::BTreeSet;

use meshgate_shared::{DeviceAddress, Event, LcdText, Pulse, RelayChannel, RelayState};
use serde_json::Value;

use crate::hardware::{Hardware, VirtualBoard};
use crate::transport::{ControlSurface, RadioError, RadioLink};

/// Hardware writes seen by [`RecordingHardware`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareCall {
    LedSet(bool),
    PowerRelaySet(bool),
    ModuleRelaySet(RelayChannel, bool),
    ModuleRelayPulse(RelayChannel, Pulse),
    LcdClear,
    LcdDrawText(LcdText),
}

/// Virtual board that also records every write
#[derive(Debug, Default)]
pub struct RecordingHardware {
    board: VirtualBoard,
    pub calls: Vec<HardwareCall>,
}

impl Hardware for RecordingHardware {
    fn led_set(&mut self, on: bool) {
        self.calls.push(HardwareCall::LedSet(on));
        self.board.led_set(on);
    }

    fn led_get(&self) -> bool {
        self.board.led_get()
    }

    fn power_relay_set(&mut self, on: bool) {
        self.calls.push(HardwareCall::PowerRelaySet(on));
        self.board.power_relay_set(on);
    }

    fn power_relay_get(&self) -> bool {
        self.board.power_relay_get()
    }

    fn module_relay_set(&mut self, channel: RelayChannel, on: bool) {
        self.calls.push(HardwareCall::ModuleRelaySet(channel, on));
        self.board.module_relay_set(channel, on);
    }

    fn module_relay_get(&self, channel: RelayChannel) -> RelayState {
        self.board.module_relay_get(channel)
    }

    fn module_relay_pulse(&mut self, channel: RelayChannel, pulse: Pulse) {
        self.calls.push(HardwareCall::ModuleRelayPulse(channel, pulse));
        self.board.module_relay_pulse(channel, pulse);
    }

    fn lcd_clear(&mut self) {
        self.calls.push(HardwareCall::LcdClear);
        self.board.lcd_clear();
    }

    fn lcd_draw_text(&mut self, text: &LcdText) {
        self.calls.push(HardwareCall::LcdDrawText(text.clone()));
        self.board.lcd_draw_text(text);
    }
}

#[derive(Debug, Default)]
pub struct RecordingRadio {
    pub sent: Vec<(DeviceAddress, Vec<u8>)>,
    pub peers: BTreeSet<DeviceAddress>,
    /// Targets that have no route
    pub unreachable: BTreeSet<DeviceAddress>,
    /// Fail every send once this many frames went out
    pub fail_after: Option<usize>,
}

impl RadioLink for RecordingRadio {
    fn send(&mut self, target: DeviceAddress, frame: &[u8]) -> Result<(), RadioError> {
        if self.unreachable.contains(&target) {
            return Err(RadioError::NoRoute(target));
        }
        if self.fail_after.is_some_and(|limit| self.sent.len() >= limit) {
            return Err(RadioError::Io(std::io::ErrorKind::WouldBlock.into()));
        }
        self.sent.push((target, frame.to_vec()));
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

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub events: Vec<Event>,
    pub notices: Vec<(String, Value)>,
}

impl ControlSurface for RecordingSurface {
    fn publish(&mut self, event: &Event) {
        self.events.push(event.clone());
    }

    fn notify(&mut self, topic: &str, payload: Value) {
        self.notices.push((topic.to_string(), payload));
    }
}
