//! LED, power relay and relay module channels

use meshgate_shared::limits::DEFAULT_PULSE_MS;
use meshgate_shared::{Payload, Pulse, RelayChannel, Telemetry, ValidationError};

use crate::hardware::Hardware;

pub fn parse_state(payload: &Payload) -> Result<bool, ValidationError> {
    payload.as_bool("state")
}

/// `{"duration": ms, "direction": bool}`, both optional
pub fn parse_pulse(payload: &Payload) -> Result<Pulse, ValidationError> {
    let duration = payload.key_int_or("duration", DEFAULT_PULSE_MS)?;
    let direction = payload.key_bool_or("direction", true)?;
    Pulse::new(direction, duration)
}

/// Requests the gateway's own switches can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchRequest {
    LedSet(bool),
    LedGet,
    PowerRelaySet(bool),
    PowerRelayGet,
    ModuleRelaySet(RelayChannel, bool),
    ModuleRelayGet(RelayChannel),
    ModuleRelayPulse(RelayChannel, Pulse),
}

/// Sets are confirmed by reading the state back; pulses report nothing
pub fn execute<H: Hardware>(hardware: &mut H, request: SwitchRequest) -> Option<Telemetry> {
    match request {
        SwitchRequest::LedSet(state) => {
            hardware.led_set(state);
            Some(Telemetry::Led {
                state: hardware.led_get(),
            })
        }
        SwitchRequest::LedGet => Some(Telemetry::Led {
            state: hardware.led_get(),
        }),
        SwitchRequest::PowerRelaySet(state) => {
            hardware.power_relay_set(state);
            Some(Telemetry::RelayPower {
                state: hardware.power_relay_get(),
            })
        }
        SwitchRequest::PowerRelayGet => Some(Telemetry::RelayPower {
            state: hardware.power_relay_get(),
        }),
        SwitchRequest::ModuleRelaySet(channel, state) => {
            hardware.module_relay_set(channel, state);
            Some(Telemetry::ModuleRelay {
                channel,
                state: hardware.module_relay_get(channel),
            })
        }
        SwitchRequest::ModuleRelayGet(channel) => Some(Telemetry::ModuleRelay {
            channel,
            state: hardware.module_relay_get(channel),
        }),
        SwitchRequest::ModuleRelayPulse(channel, pulse) => {
            hardware.module_relay_pulse(channel, pulse);
            None
        }
    }
}
