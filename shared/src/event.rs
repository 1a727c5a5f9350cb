//! Events published on the control surface
//!
//! An [`Event`] is what the gateway tells its controller: a state change on
//! the gateway itself, or a decoded report from a peer. The label names the
//! quantity, the value kind decides how the label expands into a topic.

use serde_json::{json, Value};

use crate::address::DeviceAddress;
use crate::frame::{RelayChannel, Telemetry};

/// Value carried by an event
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Str(String),
    Null,
    /// Counter of a motion or alert sensor
    EventCount(u16),
    /// Press counter of a push button
    PushButton(u16),
    Acceleration { x: f32, y: f32, z: f32 },
}

impl TypedValue {
    /// JSON rendering; floats keep two decimals
    pub fn to_json(&self) -> Value {
        match self {
            TypedValue::Bool(b) => Value::Bool(*b),
            TypedValue::Int(i) => json!(i),
            TypedValue::Float(f) => rounded(*f),
            TypedValue::Str(s) => Value::String(s.clone()),
            TypedValue::Null => Value::Null,
            TypedValue::EventCount(n) | TypedValue::PushButton(n) => json!(n),
            TypedValue::Acceleration { x, y, z } => {
                Value::Array(vec![rounded(*x), rounded(*y), rounded(*z)])
            }
        }
    }
}

fn rounded(value: f32) -> Value {
    let value = (f64::from(value) * 100.0).round() / 100.0;
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub source: DeviceAddress,
    pub label: String,
    pub value: TypedValue,
}

impl Event {
    pub fn new(source: DeviceAddress, label: impl Into<String>, value: TypedValue) -> Self {
        Self {
            source,
            label: label.into(),
            value,
        }
    }

    /// Topic below the source address
    pub fn topic(&self) -> String {
        match self.value {
            TypedValue::EventCount(_) => format!("{}/-/event-count", self.label),
            TypedValue::PushButton(_) => format!("push-button/{}/event-count", self.label),
            TypedValue::Acceleration { .. } => format!("{}/-/acceleration", self.label),
            _ => self.label.clone(),
        }
    }

    /// Full topic as written on the control link
    pub fn wire_topic(&self) -> String {
        format!("{}/{}", self.source, self.topic())
    }
}

fn relay_state_label(channel: RelayChannel) -> String {
    format!("relay/0:{}/state", channel.index())
}

impl Telemetry {
    /// Event for a report received from `source`
    pub fn into_event(self, source: DeviceAddress) -> Event {
        let (label, value) = match self {
            Telemetry::PushButton { count } => ("-".to_string(), TypedValue::PushButton(count)),
            Telemetry::LcdButton { button, count } => {
                (button.label().to_string(), TypedValue::PushButton(count))
            }
            Telemetry::Thermometer {
                channel,
                temperature,
            } => (
                format!("thermometer/{channel}/temperature"),
                TypedValue::Float(temperature),
            ),
            Telemetry::Humidity {
                channel,
                percentage,
            } => (
                format!("hygrometer/{channel}/relative-humidity"),
                TypedValue::Float(percentage),
            ),
            Telemetry::LuxMeter {
                channel,
                illuminance,
            } => (
                format!("lux-meter/{channel}/illuminance"),
                TypedValue::Float(illuminance),
            ),
            Telemetry::Co2 { concentration } => (
                "co2-meter/-/concentration".to_string(),
                TypedValue::Float(concentration),
            ),
            Telemetry::Battery { format, voltage } => (
                format!("battery/{}/voltage", format.label()),
                TypedValue::Float(voltage),
            ),
            Telemetry::Led { state } => ("led/-/state".to_string(), TypedValue::Bool(state)),
            Telemetry::RelayPower { state } => {
                ("relay/-/state".to_string(), TypedValue::Bool(state))
            }
            Telemetry::ModuleRelay { channel, state } => (
                relay_state_label(channel),
                state.as_bool().map_or(TypedValue::Null, TypedValue::Bool),
            ),
            Telemetry::Pir { count } => ("pir".to_string(), TypedValue::EventCount(count)),
            Telemetry::FloodDetector { kind, alarm } => (
                format!("flood-detector/{kind}/alarm"),
                TypedValue::Bool(alarm),
            ),
            Telemetry::AccelerometerAlert { count } => {
                ("accelerometer".to_string(), TypedValue::EventCount(count))
            }
            Telemetry::Acceleration { x, y, z } => (
                "accelerometer".to_string(),
                TypedValue::Acceleration { x, y, z },
            ),
            Telemetry::MagnetSwitch { channel, state } => (
                format!("magnet-switch/{}/state", channel.label()),
                TypedValue::Bool(state),
            ),
            Telemetry::ThermostatSetPoint { temperature } => (
                "thermostat/set-point/temperature".to_string(),
                TypedValue::Float(temperature),
            ),
            Telemetry::WateringHumidity { level } => (
                "watering/-/humidity".to_string(),
                TypedValue::Int(level.into()),
            ),
            Telemetry::WateringPump { level } => {
                ("watering/-/pump".to_string(), TypedValue::Int(level.into()))
            }
            Telemetry::WateringWaterLevel { level } => (
                "watering/-/water-level".to_string(),
                TypedValue::Int(level.into()),
            ),
            Telemetry::UserBool { topic, value } => (topic, TypedValue::Bool(value)),
            Telemetry::UserInt { topic, value } => (topic, TypedValue::Int(value.into())),
            Telemetry::UserFloat { topic, value } => (topic, TypedValue::Float(value)),
        };
        Event {
            source,
            label,
            value,
        }
    }
}
