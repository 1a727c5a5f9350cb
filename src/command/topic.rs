//! Topic table
//!
//! Maps the topic of a control message to what the router should do with
//! it. Device topics follow the address (`<addr>/led/-/state/set`), gateway
//! topics start with `/`.

use meshgate_shared::RelayChannel;

/// What a topic asks the router to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Executed on the target device, local or remote
    Device(DeviceAction),
    /// Handled by the gateway itself
    Gateway(GatewayAction),
}

/// Device action with its bound parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAction {
    LedSet,
    LedGet,
    PowerRelaySet,
    PowerRelayGet,
    ModuleRelaySet(RelayChannel),
    ModuleRelayGet(RelayChannel),
    ModuleRelayPulse(RelayChannel),
    LcdTextSet,
    LcdScreenClear,
    LedStripColorSet,
    LedStripBrightnessSet,
    LedStripCompoundSet,
    LedStripEffectSet,
    LedStripThermometerSet,
    ThermostatUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayAction {
    InfoGet,
    NodesGet,
    NodesAdd,
    NodesRemove,
    NodesPurge,
}

use DeviceAction as D;
use GatewayAction as G;

const TOPICS: &[(&str, Action)] = &[
    ("led/-/state/set", Action::Device(D::LedSet)),
    ("led/-/state/get", Action::Device(D::LedGet)),
    ("relay/-/state/set", Action::Device(D::PowerRelaySet)),
    ("relay/-/state/get", Action::Device(D::PowerRelayGet)),
    ("relay/0:0/state/set", Action::Device(D::ModuleRelaySet(RelayChannel::Zero))),
    ("relay/0:0/state/get", Action::Device(D::ModuleRelayGet(RelayChannel::Zero))),
    ("relay/0:0/pulse/set", Action::Device(D::ModuleRelayPulse(RelayChannel::Zero))),
    ("relay/0:1/state/set", Action::Device(D::ModuleRelaySet(RelayChannel::One))),
    ("relay/0:1/state/get", Action::Device(D::ModuleRelayGet(RelayChannel::One))),
    ("relay/0:1/pulse/set", Action::Device(D::ModuleRelayPulse(RelayChannel::One))),
    ("lcd/-/text/set", Action::Device(D::LcdTextSet)),
    ("lcd/-/screen/clear", Action::Device(D::LcdScreenClear)),
    ("led-strip/-/color/set", Action::Device(D::LedStripColorSet)),
    ("led-strip/-/brightness/set", Action::Device(D::LedStripBrightnessSet)),
    ("led-strip/-/compound/set", Action::Device(D::LedStripCompoundSet)),
    ("led-strip/-/effect/set", Action::Device(D::LedStripEffectSet)),
    ("led-strip/-/thermometer/set", Action::Device(D::LedStripThermometerSet)),
    ("thermostat/-/update/set", Action::Device(D::ThermostatUpdate)),
    ("/info/get", Action::Gateway(G::InfoGet)),
    ("/nodes/get", Action::Gateway(G::NodesGet)),
    ("/nodes/add", Action::Gateway(G::NodesAdd)),
    ("/nodes/remove", Action::Gateway(G::NodesRemove)),
    ("/nodes/purge", Action::Gateway(G::NodesPurge)),
];

/// Static topic lookup
#[derive(Debug, Clone, Copy, Default)]
pub struct TopicTable;

impl TopicTable {
    pub fn lookup(&self, topic: &str) -> Option<Action> {
        TOPICS
            .iter()
            .find(|(pattern, _)| *pattern == topic)
            .map(|(_, action)| *action)
    }

    #[cfg(test)]
    pub fn topics(&self) -> impl Iterator<Item = &'static str> {
        TOPICS.iter().map(|(pattern, _)| *pattern)
    }
}
