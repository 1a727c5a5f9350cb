//! Meshgate Shared Protocol Types
//!
//! This crate provides the radio frame codec, the typed command and telemetry
//! values, and the JSON line format spoken on the control link of the USB
//! gateway.

pub mod address;
pub mod codec;
pub mod color;
pub mod compound;
pub mod event;
pub mod frame;
pub mod line;
pub mod payload;
pub mod tag;

// Re-export commonly used types at crate root
pub use address::{AddressError, DeviceAddress};
pub use codec::{decode, encode, DecodeError};
pub use color::Color;
pub use compound::{CompoundChunk, CompoundChunks, CompoundProgram, Segment};
pub use event::{Event, TypedValue};
pub use frame::{
    check_range, BatteryFormat, Brightness, Effect, EffectKind, Frame, LcdButton, LcdText,
    MagnetChannel, Pulse, RelayChannel, RelayState, Request, SensorChannel, Telemetry,
    ThermometerScale, ValidationError,
};
pub use line::{ControlMessage, LineDecoder, LineError};
pub use payload::Payload;
pub use tag::{Direction, Layout, MessageTag};

/// Protocol limits shared by the gateway and its peers
pub mod limits {
    /// Longest text an LCD text frame can carry, terminator excluded
    pub const LCD_TEXT_MAX: usize = 31;

    /// Maximum payload bytes in one compound LED strip frame
    pub const COMPOUND_CHUNK_MAX: usize = 45;

    /// Serialised size of one compound segment: count + R G B W
    pub const COMPOUND_SEGMENT_LEN: usize = 5;

    /// Chunking stops once this many LEDs have been programmed
    pub const COMPOUND_COUNTER_LIMIT: u32 = 255;

    /// LED strip brightness is a percentage
    pub const MAX_BRIGHTNESS: u8 = 100;

    /// Relay pulse length when the command does not give one
    pub const DEFAULT_PULSE_MS: i64 = 500;

    /// LCD font size when the command does not give one
    pub const DEFAULT_LCD_FONT: u8 = 15;

    /// Longest control line accepted before the link is considered garbage
    pub const MAX_LINE_LEN: usize = 4096;
}
