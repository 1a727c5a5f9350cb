use meshgate_shared::{LcdText, Pulse, RelayChannel, RelayState};
use tracing::info;

use super::Hardware;

/// In-memory gateway board
#[derive(Debug)]
pub struct VirtualBoard {
    led: bool,
    power_relay: bool,
    module_relays: [RelayState; 2],
    lcd_lines: Vec<String>,
}

impl Default for VirtualBoard {
    fn default() -> Self {
        Self {
            led: false,
            power_relay: false,
            module_relays: [RelayState::Unknown; 2],
            lcd_lines: Vec::new(),
        }
    }
}

impl VirtualBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text drawn since the last clear
    #[cfg(test)]
    pub fn lcd_lines(&self) -> &[String] {
        &self.lcd_lines
    }
}

impl Hardware for VirtualBoard {
    fn led_set(&mut self, on: bool) {
        info!("[BOARD] LED {}", if on { "on" } else { "off" });
        self.led = on;
    }

    fn led_get(&self) -> bool {
        self.led
    }

    fn power_relay_set(&mut self, on: bool) {
        info!("[BOARD] Power relay {}", if on { "on" } else { "off" });
        self.power_relay = on;
    }

    fn power_relay_get(&self) -> bool {
        self.power_relay
    }

    fn module_relay_set(&mut self, channel: RelayChannel, on: bool) {
        info!(
            "[BOARD] Module relay {} {}",
            channel.index(),
            if on { "on" } else { "off" }
        );
        self.module_relays[channel.index() as usize] = RelayState::from(on);
    }

    fn module_relay_get(&self, channel: RelayChannel) -> RelayState {
        self.module_relays[channel.index() as usize]
    }

    fn module_relay_pulse(&mut self, channel: RelayChannel, pulse: Pulse) {
        info!(
            "[BOARD] Module relay {} pulse direction={} duration={}ms",
            channel.index(),
            pulse.direction,
            pulse.duration_ms
        );
        // the relay is left in the opposite position once the pulse ends
        self.module_relays[channel.index() as usize] = RelayState::from(!pulse.direction);
    }

    fn lcd_clear(&mut self) {
        info!("[BOARD] LCD clear");
        self.lcd_lines.clear();
    }

    fn lcd_draw_text(&mut self, text: &LcdText) {
        info!(
            "[BOARD] LCD text at ({}, {}) font={} color={}: {:?}",
            text.x,
            text.y,
            text.font,
            text.color,
            text.text()
        );
        self.lcd_lines.push(text.text().to_string());
    }
}
