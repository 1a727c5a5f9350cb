//! Actuators wired to the gateway itself
//!
//! The router only talks to [`Hardware`]; [`VirtualBoard`] keeps the state
//! in memory and logs every change, standing in for the real drivers.

mod virtual_board;

pub use virtual_board::VirtualBoard;

use meshgate_shared::{LcdText, Pulse, RelayChannel, RelayState};

pub trait Hardware {
    fn led_set(&mut self, on: bool);
    fn led_get(&self) -> bool;

    fn power_relay_set(&mut self, on: bool);
    fn power_relay_get(&self) -> bool;

    fn module_relay_set(&mut self, channel: RelayChannel, on: bool);
    /// `Unknown` until the channel has been driven once
    fn module_relay_get(&self, channel: RelayChannel) -> RelayState;
    fn module_relay_pulse(&mut self, channel: RelayChannel, pulse: Pulse);

    fn lcd_clear(&mut self);
    fn lcd_draw_text(&mut self, text: &LcdText);
}
