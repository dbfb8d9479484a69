//! Two-line HT16K33 LED display.

use crate::bus::{BusError, TwoWire, transmit};
use crate::config::DISPLAY_BRIGHTNESS;
use crate::frame::{LedFrame, Line};

/// Display blink rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum BlinkRate {
    Off = 0,
    TwoHz = 2,
    OneHz = 4,
    HalfHz = 6,
}

/// One-byte controller commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Command {
    OscillatorOn,
    /// Display on, with the given blink rate.
    Blink(BlinkRate),
    /// Duty cycle `0..=15`; larger values are clamped.
    Brightness(u8),
}

impl Command {
    const OSCILLATOR_ON: u8 = 0x21;
    const BLINK: u8 = 0x80;
    const DISPLAY_ON: u8 = 0x01;
    const BRIGHTNESS: u8 = 0xE0;

    pub const fn byte(self) -> u8 {
        match self {
            Self::OscillatorOn => Self::OSCILLATOR_ON,
            Self::Blink(rate) => Self::BLINK | Self::DISPLAY_ON | rate as u8,
            Self::Brightness(level) => {
                Self::BRIGHTNESS | if level > 15 { 15 } else { level }
            }
        }
    }
}

/// Both display lines on one bus.
///
/// Only [`LedDisplay::configure`] builds one, so a display is never drawn to
/// before its controllers are running.
pub struct LedDisplay<B> {
    bus: B,
}

impl<B: TwoWire> LedDisplay<B> {
    /// Start the oscillator, switch the display on without blinking and set
    /// brightness, on both lines.
    ///
    /// Every command goes to every line even after a failure, so one lost
    /// command does not keep the rest of the setup from a line.
    pub fn configure(bus: B) -> Self {
        let mut display = Self { bus };
        for line in Line::ALL {
            for command in [
                Command::OscillatorOn,
                Command::Blink(BlinkRate::Off),
                Command::Brightness(DISPLAY_BRIGHTNESS),
            ] {
                // failures are logged by `command`
                display.command(line, command).ok();
            }
        }
        display
    }

    /// Send one command to `line`.
    pub fn command(
        &mut self,
        line: Line,
        command: Command,
    ) -> Result<(), BusError> {
        let result = transmit(&mut self.bus, line.address(), &[command.byte()]);
        if let Err(_error) = result {
            #[cfg(target_arch = "arm")]
            defmt::warn!("display {}: {} failed: {}", line, command, _error);
        }
        result
    }

    /// Write a whole frame to `line`.
    ///
    /// A failed write drops the frame; the next render replaces it anyway.
    pub fn show(
        &mut self,
        line: Line,
        frame: &LedFrame,
    ) -> Result<(), BusError> {
        let result = transmit(&mut self.bus, line.address(), frame.as_ref());
        if let Err(_error) = result {
            #[cfg(target_arch = "arm")]
            defmt::debug!("display {}: frame dropped: {}", line, _error);
        }
        result
    }

    pub fn release(self) -> B { self.bus }
}

// =============================================================================
// Unit Tests
// =============================================================================
