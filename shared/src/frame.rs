//! Typed frame contents
//!
//! Every value here is validated on construction, so encoding a [`Frame`]
//! cannot fail. Bounds that the control surface can violate are checked by
//! the constructors and reported as [`ValidationError`].

use std::fmt;

use thiserror::Error;

use crate::address::DeviceAddress;
use crate::color::Color;
use crate::compound::CompoundChunk;
use crate::limits::{LCD_TEXT_MAX, MAX_BRIGHTNESS};
use crate::tag::MessageTag;

/// Reasons a command is refused before any frame is built
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field `{field}` = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("invalid colour {0:?}, expected #RRGGBB or #RRGGBB(WW)")]
    InvalidColor(String),

    #[error("field `{field}` has unknown value {value:?}")]
    UnknownVariant { field: &'static str, value: String },

    #[error("text is {len} bytes, at most {max} allowed")]
    TextTooLong { len: usize, max: usize },

    #[error("text contains a NUL byte")]
    TextContainsNul,

    #[error("invalid compound program: {0}")]
    InvalidCompound(String),
}

/// Integer field bounds check shared by every validated type
pub fn check_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<i64, ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

/// Channel on the two-channel relay module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayChannel {
    Zero,
    One,
}

impl RelayChannel {
    pub fn index(self) -> u8 {
        match self {
            RelayChannel::Zero => 0,
            RelayChannel::One => 1,
        }
    }

    pub(crate) fn state_tag(self) -> MessageTag {
        match self {
            RelayChannel::Zero => MessageTag::Relay0,
            RelayChannel::One => MessageTag::Relay1,
        }
    }

    pub(crate) fn set_tag(self) -> MessageTag {
        match self {
            RelayChannel::Zero => MessageTag::Relay0Set,
            RelayChannel::One => MessageTag::Relay1Set,
        }
    }

    pub(crate) fn get_tag(self) -> MessageTag {
        match self {
            RelayChannel::Zero => MessageTag::Relay0Get,
            RelayChannel::One => MessageTag::Relay1Get,
        }
    }

    pub(crate) fn pulse_tag(self) -> MessageTag {
        match self {
            RelayChannel::Zero => MessageTag::Relay0PulseSet,
            RelayChannel::One => MessageTag::Relay1PulseSet,
        }
    }
}

/// State reported by a relay module channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Off,
    On,
    Unknown,
}

impl RelayState {
    pub fn byte(self) -> u8 {
        match self {
            RelayState::Off => 0,
            RelayState::On => 1,
            RelayState::Unknown => 2,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(RelayState::Off),
            1 => Some(RelayState::On),
            2 => Some(RelayState::Unknown),
            _ => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            RelayState::Off => Some(false),
            RelayState::On => Some(true),
            RelayState::Unknown => None,
        }
    }
}

impl From<bool> for RelayState {
    fn from(on: bool) -> Self {
        if on {
            RelayState::On
        } else {
            RelayState::Off
        }
    }
}

/// Timed relay flip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub direction: bool,
    pub duration_ms: i32,
}

impl Pulse {
    pub fn new(direction: bool, duration_ms: i64) -> Result<Self, ValidationError> {
        let duration_ms = check_range("duration", duration_ms, 0, i32::MAX as i64)? as i32;
        Ok(Self {
            direction,
            duration_ms,
        })
    }
}

/// Text drawn on a peer's LCD module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcdText {
    /// Signed on the wire; text may start left of or above the screen
    pub x: i8,
    pub y: i8,
    pub font: u8,
    pub color: bool,
    text: String,
}

impl LcdText {
    pub fn new(
        x: i64,
        y: i64,
        font: i64,
        color: bool,
        text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.len() > LCD_TEXT_MAX {
            return Err(ValidationError::TextTooLong {
                len: text.len(),
                max: LCD_TEXT_MAX,
            });
        }
        if text.contains('\0') {
            return Err(ValidationError::TextContainsNul);
        }
        Ok(Self {
            x: check_range("x", x, i8::MIN as i64, i8::MAX as i64)? as i8,
            y: check_range("y", y, i8::MIN as i64, i8::MAX as i64)? as i8,
            font: check_range("font", font, 0, u8::MAX as i64)? as u8,
            color,
            text,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// LED strip brightness in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brightness(u8);

impl Brightness {
    pub fn new(level: i64) -> Result<Self, ValidationError> {
        Ok(Self(check_range("brightness", level, 0, MAX_BRIGHTNESS as i64)? as u8))
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

/// Temperature bar shown on an LED strip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermometerScale {
    pub temperature: f32,
    pub min: i8,
    pub max: i8,
}

impl ThermometerScale {
    pub fn new(temperature: f32, min: i64, max: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            temperature,
            min: check_range("min", min, i8::MIN as i64, i8::MAX as i64)? as i8,
            max: check_range("max", max, i8::MIN as i64, i8::MAX as i64)? as i8,
        })
    }
}

/// Built-in LED strip animations, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EffectKind {
    Test = 0,
    Rainbow = 1,
    RainbowCycle = 2,
    TheaterChaseRainbow = 3,
    ColorWipe = 4,
    TheaterChase = 5,
}

impl EffectKind {
    pub const NAMES: [&'static str; 6] = [
        "test",
        "rainbow",
        "rainbow-cycle",
        "theater-chase-rainbow",
        "color-wipe",
        "theater-chase",
    ];

    const ALL: [EffectKind; 6] = [
        EffectKind::Test,
        EffectKind::Rainbow,
        EffectKind::RainbowCycle,
        EffectKind::TheaterChaseRainbow,
        EffectKind::ColorWipe,
        EffectKind::TheaterChase,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::from_index(byte as usize)
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    pub fn needs_wait(self) -> bool {
        self > EffectKind::Test
    }

    pub fn needs_color(self) -> bool {
        self > EffectKind::TheaterChaseRainbow
    }
}

/// LED strip animation with the parameters its kind requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    kind: EffectKind,
    wait: Option<u16>,
    color: Option<Color>,
}

impl Effect {
    /// `wait` is required by every kind except `test`, `color` by the
    /// colour-wipe and theater-chase kinds. Extra parameters are dropped.
    pub fn new(
        kind: EffectKind,
        wait: Option<i64>,
        color: Option<Color>,
    ) -> Result<Self, ValidationError> {
        let wait = if kind.needs_wait() {
            let wait = wait.ok_or(ValidationError::MissingField("wait"))?;
            Some(check_range("wait", wait, 0, u16::MAX as i64)? as u16)
        } else {
            None
        };
        let color = if kind.needs_color() {
            Some(color.ok_or(ValidationError::MissingField("color"))?)
        } else {
            None
        };
        Ok(Self { kind, wait, color })
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn wait(&self) -> Option<u16> {
        self.wait
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }
}

/// Payload of a command frame sent to a peer
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    LedSet { state: bool },
    LedGet,
    RelayPowerSet { state: bool },
    RelayPowerGet,
    ModuleRelaySet { channel: RelayChannel, state: bool },
    ModuleRelayGet { channel: RelayChannel },
    ModuleRelayPulse { channel: RelayChannel, pulse: Pulse },
    LcdTextSet(LcdText),
    LcdScreenClear,
    LedStripColorSet(Color),
    LedStripBrightnessSet(Brightness),
    LedStripCompoundSet(CompoundChunk),
    LedStripEffectSet(Effect),
    LedStripThermometerSet(ThermometerScale),
    ThermostatUpdate { index: u8, value: f32 },
}

impl Request {
    pub fn tag(&self) -> MessageTag {
        match self {
            Request::LedSet { .. } => MessageTag::LedSet,
            Request::LedGet => MessageTag::LedGet,
            Request::RelayPowerSet { .. } => MessageTag::RelayPowerSet,
            Request::RelayPowerGet => MessageTag::RelayPowerGet,
            Request::ModuleRelaySet { channel, .. } => channel.set_tag(),
            Request::ModuleRelayGet { channel } => channel.get_tag(),
            Request::ModuleRelayPulse { channel, .. } => channel.pulse_tag(),
            Request::LcdTextSet(_) => MessageTag::LcdTextSet,
            Request::LcdScreenClear => MessageTag::LcdScreenClear,
            Request::LedStripColorSet(_) => MessageTag::LedStripColorSet,
            Request::LedStripBrightnessSet(_) => MessageTag::LedStripBrightnessSet,
            Request::LedStripCompoundSet(_) => MessageTag::LedStripCompoundSet,
            Request::LedStripEffectSet(_) => MessageTag::LedStripEffectSet,
            Request::LedStripThermometerSet(_) => MessageTag::LedStripThermometerSet,
            Request::ThermostatUpdate { .. } => MessageTag::ThermostatUpdate,
        }
    }
}

/// LCD module side button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcdButton {
    Left,
    Right,
}

impl LcdButton {
    pub fn label(self) -> &'static str {
        match self {
            LcdButton::Left => "lcd:left",
            LcdButton::Right => "lcd:right",
        }
    }
}

/// Magnet switch input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagnetChannel {
    A,
    B,
}

impl MagnetChannel {
    pub fn byte(self) -> u8 {
        match self {
            MagnetChannel::A => 0,
            MagnetChannel::B => 1,
        }
    }

    /// Anything other than channel A is reported as B
    pub fn from_byte(byte: u8) -> Self {
        if byte == 0 {
            MagnetChannel::A
        } else {
            MagnetChannel::B
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MagnetChannel::A => "a",
            MagnetChannel::B => "b",
        }
    }
}

/// Battery module variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryFormat {
    Standard,
    Mini,
}

impl BatteryFormat {
    pub fn byte(self) -> u8 {
        match self {
            BatteryFormat::Standard => 0,
            BatteryFormat::Mini => 1,
        }
    }

    pub fn from_byte(byte: u8) -> Self {
        if byte == 0 {
            BatteryFormat::Standard
        } else {
            BatteryFormat::Mini
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BatteryFormat::Standard => "standard",
            BatteryFormat::Mini => "mini",
        }
    }
}

/// I2C location of a sensor: bit 7 selects the bus, the rest is the address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorChannel(pub u8);

impl fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", (self.0 & 0x80) >> 7, self.0 & 0x7f)
    }
}

/// Reports sent by peers
#[derive(Debug, Clone, PartialEq)]
pub enum Telemetry {
    PushButton { count: u16 },
    LcdButton { button: LcdButton, count: u16 },
    Thermometer { channel: SensorChannel, temperature: f32 },
    Humidity { channel: SensorChannel, percentage: f32 },
    LuxMeter { channel: SensorChannel, illuminance: f32 },
    Co2 { concentration: f32 },
    Battery { format: BatteryFormat, voltage: f32 },
    Led { state: bool },
    RelayPower { state: bool },
    ModuleRelay { channel: RelayChannel, state: RelayState },
    Pir { count: u16 },
    FloodDetector { kind: u8, alarm: bool },
    AccelerometerAlert { count: u16 },
    Acceleration { x: f32, y: f32, z: f32 },
    MagnetSwitch { channel: MagnetChannel, state: bool },
    ThermostatSetPoint { temperature: f32 },
    WateringHumidity { level: u8 },
    WateringPump { level: u8 },
    WateringWaterLevel { level: u8 },
    UserBool { topic: String, value: bool },
    UserInt { topic: String, value: i32 },
    UserFloat { topic: String, value: f32 },
}

impl Telemetry {
    pub fn tag(&self) -> MessageTag {
        match self {
            Telemetry::PushButton { .. } => MessageTag::PushButton,
            Telemetry::LcdButton {
                button: LcdButton::Left,
                ..
            } => MessageTag::LcdButtonLeft,
            Telemetry::LcdButton {
                button: LcdButton::Right,
                ..
            } => MessageTag::LcdButtonRight,
            Telemetry::Thermometer { .. } => MessageTag::Thermometer,
            Telemetry::Humidity { .. } => MessageTag::Humidity,
            Telemetry::LuxMeter { .. } => MessageTag::LuxMeter,
            Telemetry::Co2 { .. } => MessageTag::Co2,
            Telemetry::Battery { .. } => MessageTag::Battery,
            Telemetry::Led { .. } => MessageTag::Led,
            Telemetry::RelayPower { .. } => MessageTag::RelayPower,
            Telemetry::ModuleRelay { channel, .. } => channel.state_tag(),
            Telemetry::Pir { .. } => MessageTag::Pir,
            Telemetry::FloodDetector { .. } => MessageTag::FloodDetector,
            Telemetry::AccelerometerAlert { .. } => MessageTag::AccelerometerAlert,
            Telemetry::Acceleration { .. } => MessageTag::AccelerometerAcceleration,
            Telemetry::MagnetSwitch { .. } => MessageTag::MagnetSwitchState,
            Telemetry::ThermostatSetPoint { .. } => MessageTag::ThermostatSetPointTemperature,
            Telemetry::WateringHumidity { .. } => MessageTag::WateringHumidity,
            Telemetry::WateringPump { .. } => MessageTag::WateringPump,
            Telemetry::WateringWaterLevel { .. } => MessageTag::WateringWaterLevel,
            Telemetry::UserBool { .. } => MessageTag::UserTopicBool,
            Telemetry::UserInt { .. } => MessageTag::UserTopicInt,
            Telemetry::UserFloat { .. } => MessageTag::UserTopicFloat,
        }
    }
}

/// One radio frame, decoded
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Gateway -> peer, addressed
    Command {
        target: DeviceAddress,
        request: Request,
    },
    /// Peer -> gateway, source supplied by the transport
    Telemetry(Telemetry),
}

impl Frame {
    pub fn command(target: DeviceAddress, request: Request) -> Self {
        Frame::Command { target, request }
    }

    pub fn tag(&self) -> MessageTag {
        match self {
            Frame::Command { request, .. } => request.tag(),
            Frame::Telemetry(telemetry) => telemetry.tag(),
        }
    }
}
