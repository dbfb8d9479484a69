//! RP2350 analog front end.
//!
//! The RP2350A brings out four ADC inputs (GPIO26-29). They serve logical
//! channels 0-3; the remaining logical channels are not wired on this board
//! and report no conversion, so sensors configured on them read as faults.

use defmt::debug;
use embassy_rp::Peri;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::gpio::Pull;
use embassy_rp::peripherals::{ADC, PIN_26, PIN_27, PIN_28, PIN_29};
use enguino_cluster::store::AnalogSource;

/// Bits dropped to turn a 12-bit conversion into the 10-bit counts the
/// calibration tables use.
const RESOLUTION_SHIFT: u16 = 2;

pub struct BoardAnalog<'d> {
    adc: Adc<'d, adc::Blocking>,
    channels: [Channel<'d>; 4],
}

impl<'d> BoardAnalog<'d> {
    pub fn new(
        adc: Peri<'d, ADC>,
        a0: Peri<'d, PIN_26>,
        a1: Peri<'d, PIN_27>,
        a2: Peri<'d, PIN_28>,
        a3: Peri<'d, PIN_29>,
    ) -> Self {
        Self {
            adc: Adc::new_blocking(adc, adc::Config::default()),
            channels: [
                Channel::new_pin(a0, Pull::None),
                Channel::new_pin(a1, Pull::None),
                Channel::new_pin(a2, Pull::None),
                Channel::new_pin(a3, Pull::None),
            ],
        }
    }
}

impl AnalogSource for BoardAnalog<'_> {
    fn read(
        &mut self,
        channel: usize,
    ) -> Option<u16> {
        let pin = self.channels.get_mut(channel)?;
        match self.adc.blocking_read(pin) {
            Ok(raw) => Some(raw >> RESOLUTION_SHIFT),
            Err(error) => {
                debug!("adc channel {}: {}", channel, error);
                None
            }
        }
    }
}
