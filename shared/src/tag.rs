//! Message tag space
//!
//! The first byte of every radio frame. Byte values and the layouts behind
//! them are frozen once deployed; new message kinds take new values.

use crate::limits::{COMPOUND_CHUNK_MAX, LCD_TEXT_MAX};

/// Length of the target address embedded in command frames
pub const ADDRESS_LEN: usize = 8;

/// Frame length rule for a tag, counted including the tag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Exactly this many bytes
    Fixed(usize),
    /// Between `min` and `max` bytes inclusive
    Variable { min: usize, max: usize },
}

impl Layout {
    pub fn accepts(&self, len: usize) -> bool {
        match *self {
            Layout::Fixed(n) => len == n,
            Layout::Variable { min, max } => len >= min && len <= max,
        }
    }
}

/// Whether a tag travels gateway -> peer or peer -> gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Carries a target address after the tag
    Command,
    /// Source address is supplied out-of-band by the transport
    Telemetry,
}

macro_rules! message_tags {
    ($($(#[$meta:meta])* $name:ident = $value:expr,)+) => {
        /// Frame type identifier
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum MessageTag {
            $($(#[$meta])* $name = $value,)+
        }

        impl MessageTag {
            /// Every assigned tag, in byte order
            pub const ALL: &'static [MessageTag] = &[$(MessageTag::$name,)+];
        }

        impl TryFrom<u8> for MessageTag {
            type Error = u8;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(MessageTag::$name),)+
                    other => Err(other),
                }
            }
        }
    };
}

message_tags! {
    PushButton = 0x01,
    Thermometer = 0x02,
    Humidity = 0x03,
    LuxMeter = 0x04,
    Co2 = 0x06,
    Battery = 0x08,

    /// LED state broadcast
    Led = 0x10,
    LedSet = 0x11,
    LedGet = 0x12,
    /// Power relay state broadcast
    RelayPower = 0x13,
    RelayPowerSet = 0x14,
    RelayPowerGet = 0x15,
    /// Relay module channel 0 state broadcast
    Relay0 = 0x16,
    Relay0Set = 0x17,
    Relay0Get = 0x18,
    Relay0PulseSet = 0x19,
    /// Relay module channel 1 state broadcast
    Relay1 = 0x1a,
    Relay1Set = 0x1b,
    Relay1Get = 0x1c,
    Relay1PulseSet = 0x1d,

    LcdTextSet = 0x20,
    LcdScreenClear = 0x21,
    LcdButtonLeft = 0x22,
    LcdButtonRight = 0x23,

    LedStripColorSet = 0x30,
    LedStripBrightnessSet = 0x31,
    LedStripCompoundSet = 0x32,
    LedStripEffectSet = 0x33,
    LedStripThermometerSet = 0x34,

    Pir = 0x40,
    FloodDetector = 0x41,
    AccelerometerAlert = 0x42,
    AccelerometerAcceleration = 0x43,
    MagnetSwitchState = 0x44,

    ThermostatSetPointTemperature = 0x50,
    ThermostatUpdate = 0x51,

    UserTopicBool = 0x60,
    UserTopicInt = 0x61,
    UserTopicFloat = 0x62,

    WateringHumidity = 0xb0,
    WateringPump = 0xb1,
    WateringWaterLevel = 0xb2,
}

impl MessageTag {
    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn direction(self) -> Direction {
        use MessageTag::*;
        match self {
            LedSet | LedGet | RelayPowerSet | RelayPowerGet | Relay0Set | Relay0Get
            | Relay0PulseSet | Relay1Set | Relay1Get | Relay1PulseSet | LcdTextSet
            | LcdScreenClear | LedStripColorSet | LedStripBrightnessSet
            | LedStripCompoundSet | LedStripEffectSet | LedStripThermometerSet
            | ThermostatUpdate => Direction::Command,
            _ => Direction::Telemetry,
        }
    }

    /// Frame length rule, tag byte included
    pub fn layout(self) -> Layout {
        use MessageTag::*;
        const CMD: usize = 1 + ADDRESS_LEN;
        match self {
            PushButton | LcdButtonLeft | LcdButtonRight | Pir | AccelerometerAlert => {
                Layout::Fixed(1 + 2)
            }
            Thermometer | Humidity | LuxMeter | Battery => Layout::Fixed(1 + 1 + 4),
            Co2 | ThermostatSetPointTemperature => Layout::Fixed(1 + 4),
            Led | RelayPower | Relay0 | Relay1 => Layout::Fixed(1 + 1),
            WateringHumidity | WateringPump | WateringWaterLevel => Layout::Fixed(1 + 1),
            FloodDetector | MagnetSwitchState => Layout::Fixed(1 + 1 + 1),
            AccelerometerAcceleration => Layout::Fixed(1 + 3 * 4),

            LedSet | RelayPowerSet | Relay0Set | Relay1Set => Layout::Fixed(CMD + 1),
            LedGet | RelayPowerGet | Relay0Get | Relay1Get | LcdScreenClear => {
                Layout::Fixed(CMD)
            }
            Relay0PulseSet | Relay1PulseSet => Layout::Fixed(CMD + 1 + 4),
            LcdTextSet => Layout::Variable {
                min: CMD + 5 + 1,
                max: CMD + 5 + LCD_TEXT_MAX + 1,
            },
            LedStripColorSet => Layout::Fixed(CMD + 4),
            LedStripBrightnessSet => Layout::Fixed(CMD + 1),
            LedStripCompoundSet => Layout::Variable {
                min: CMD + 1,
                max: CMD + 1 + COMPOUND_CHUNK_MAX,
            },
            LedStripEffectSet => Layout::Fixed(CMD + 1 + 2 + 4),
            LedStripThermometerSet => Layout::Fixed(CMD + 4 + 1 + 1),
            ThermostatUpdate => Layout::Fixed(CMD + 1 + 4),

            // value + at least the topic terminator
            UserTopicBool => Layout::Variable {
                min: 1 + 1 + 1,
                max: usize::MAX,
            },
            UserTopicInt | UserTopicFloat => Layout::Variable {
                min: 1 + 4 + 1,
                max: usize::MAX,
            },
        }
    }
}
