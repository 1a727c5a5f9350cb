//! Command handlers for the different device families
//!
//! Every device command is first validated into typed [`Request`]s, which
//! are then either applied to the gateway hardware or encoded for a peer.

mod gateway;
mod lcd;
mod led_strip;
mod switch;
mod thermostat;

pub use gateway::{handle_gateway, notify_attach, notify_detach};

use lcd::LcdRequest;
use switch::SwitchRequest;

use meshgate_shared::{DeviceAddress, Payload, Request, Telemetry, ValidationError};

use super::topic::DeviceAction;
use super::RejectReason;
use crate::hardware::Hardware;

/// Context passed to command handlers
#[derive(Debug, Clone)]
pub struct HandlerContext {
    pub own_address: DeviceAddress,
    pub firmware: String,
    /// The LCD is cleared once before the first local text
    pub lcd_initialised: bool,
}

impl HandlerContext {
    pub fn new(own_address: DeviceAddress, firmware: impl Into<String>) -> Self {
        Self {
            own_address,
            firmware: firmware.into(),
            lcd_initialised: false,
        }
    }
}

/// Validate a device command into the requests it stands for
pub fn build_requests(
    action: DeviceAction,
    payload: &Payload,
) -> Result<Vec<Request>, ValidationError> {
    let request = match action {
        DeviceAction::LedSet => Request::LedSet {
            state: switch::parse_state(payload)?,
        },
        DeviceAction::LedGet => Request::LedGet,
        DeviceAction::PowerRelaySet => Request::RelayPowerSet {
            state: switch::parse_state(payload)?,
        },
        DeviceAction::PowerRelayGet => Request::RelayPowerGet,
        DeviceAction::ModuleRelaySet(channel) => Request::ModuleRelaySet {
            channel,
            state: switch::parse_state(payload)?,
        },
        DeviceAction::ModuleRelayGet(channel) => Request::ModuleRelayGet { channel },
        DeviceAction::ModuleRelayPulse(channel) => Request::ModuleRelayPulse {
            channel,
            pulse: switch::parse_pulse(payload)?,
        },
        DeviceAction::LcdTextSet => Request::LcdTextSet(lcd::parse_text(payload)?),
        DeviceAction::LcdScreenClear => Request::LcdScreenClear,
        DeviceAction::LedStripColorSet => Request::LedStripColorSet(led_strip::parse_color(payload)?),
        DeviceAction::LedStripBrightnessSet => {
            Request::LedStripBrightnessSet(led_strip::parse_brightness(payload)?)
        }
        DeviceAction::LedStripCompoundSet => return led_strip::parse_compound(payload),
        DeviceAction::LedStripEffectSet => Request::LedStripEffectSet(led_strip::parse_effect(payload)?),
        DeviceAction::LedStripThermometerSet => {
            Request::LedStripThermometerSet(led_strip::parse_thermometer(payload)?)
        }
        DeviceAction::ThermostatUpdate => thermostat::parse_update(payload)?,
    };
    Ok(vec![request])
}

/// Apply a request to the gateway's own hardware.
///
/// Returns the state to republish, if the request has one.
pub fn execute_local<H: Hardware>(
    ctx: &mut HandlerContext,
    hardware: &mut H,
    request: Request,
) -> Result<Option<Telemetry>, RejectReason> {
    let switch = match request {
        Request::LedSet { state } => SwitchRequest::LedSet(state),
        Request::LedGet => SwitchRequest::LedGet,
        Request::RelayPowerSet { state } => SwitchRequest::PowerRelaySet(state),
        Request::RelayPowerGet => SwitchRequest::PowerRelayGet,
        Request::ModuleRelaySet { channel, state } => SwitchRequest::ModuleRelaySet(channel, state),
        Request::ModuleRelayGet { channel } => SwitchRequest::ModuleRelayGet(channel),
        Request::ModuleRelayPulse { channel, pulse } => {
            SwitchRequest::ModuleRelayPulse(channel, pulse)
        }
        Request::LcdTextSet(text) => {
            lcd::execute(ctx, hardware, LcdRequest::Text(text));
            return Ok(None);
        }
        Request::LcdScreenClear => {
            lcd::execute(ctx, hardware, LcdRequest::Clear);
            return Ok(None);
        }
        Request::LedStripColorSet(_)
        | Request::LedStripBrightnessSet(_)
        | Request::LedStripCompoundSet(_)
        | Request::LedStripEffectSet(_)
        | Request::LedStripThermometerSet(_)
        | Request::ThermostatUpdate { .. } => {
            return Err(RejectReason::NotSupportedLocally(request.tag()));
        }
    };
    Ok(switch::execute(hardware, switch))
}
