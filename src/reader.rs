//! Calibrated sensor readings.
//!
//! [`SensorReader`] turns a descriptor into a reading in the sensor's physical
//! unit. Raw data is copied out of the store under synchronization first; all
//! averaging, interpolation and unit conversion runs afterwards with
//! interrupts enabled.
//!
//! | Kind | Unit |
//! |------|------|
//! | volts | per-mille of ADC full scale |
//! | 240-33 Ω sender | per-mille of gauge span |
//! | thermistor | tenths of °C / °F |
//! | thermocouple | quarter °C / °F |
//! | hours | tenths of an hour |
//! | fuel flow | tenths of a fuel unit per hour |
//! | fuel remaining | fuel units / 4 |
//! | tachometer | RPM |

use crate::alert::{AlertFlags, classify};
use crate::calibration::{
    FAHRENHEIT_OFFSET_QUARTERS,
    FAHRENHEIT_OFFSET_TENTHS,
    FUEL_FLOW_MULTIPLIER,
    J_TYPE_DENOMINATOR,
    J_TYPE_NUMERATOR,
    SENDER_240_33,
    SENDER_LINEAR_FULL,
    SENDER_LINEAR_OFFSET,
    THERMISTOR,
    VOLTS_DENOMINATOR,
    VOLTS_NUMERATOR,
};
use crate::fixed::{celsius_to_fahrenheit, scale};
use crate::sensor::{Channel, SensorDescriptor, SensorKind};
use crate::store::{ADC_DEPTH, MainPort, REFERENCE_SLOT, RPM_SLOTS};

/// Reads descriptors against the main loop's view of the sample store.
pub struct SensorReader<'a> {
    samples: &'a MainPort<'a>,
}

impl<'a> SensorReader<'a> {
    pub const fn new(samples: &'a MainPort<'a>) -> Self { Self { samples } }

    /// Read `sensor`, offset by `sub_index` channels for multi-probe sensors.
    ///
    /// `None` means the channel is absent or faulted.
    pub fn read(
        &self,
        sensor: &SensorDescriptor,
        sub_index: u8,
    ) -> Option<i32> {
        match Channel::resolve(sensor.pin, sub_index)? {
            Channel::Hobbs => Some(i32::from(self.samples.status().hobbs >> 2)),
            Channel::FuelRemaining => Some(i32::from(self.samples.status().fuel >> 2)),
            Channel::FuelFlow => {
                let count = i32::try_from(self.samples.fuel_flow_count()).ok()?;
                scale(count, FUEL_FLOW_MULTIPLIER, i32::from(self.samples.k_factor()))
            }
            Channel::Tach => Some(median_rpm(self.samples.rpm_ring())),
            Channel::Analog(channel) => {
                let average = average(&self.samples.adc_samples(channel)?)?;
                linearize_analog(sensor.kind, average)
            }
            Channel::Thermocouple(probe) => {
                let bank = self.samples.thermocouples();
                let reading = i32::from(bank[probe]?);
                linearize_thermocouple(sensor.kind, reading, bank[REFERENCE_SLOT].map(i32::from))
            }
        }
    }

    /// Read and classify `sensor`. An absent descriptor has no alerts.
    pub fn alert_state(
        &self,
        sensor: Option<&SensorDescriptor>,
        sub_index: u8,
    ) -> AlertFlags {
        match sensor {
            Some(sensor) => classify(sensor, self.read(sensor, sub_index)),
            None => AlertFlags::empty(),
        }
    }
}

/// Mean of the analog sample window. One failed conversion faults it.
fn average(samples: &[Option<u16>; ADC_DEPTH]) -> Option<i32> {
    let mut total = 0i32;
    for sample in samples {
        total += i32::from((*sample)?);
    }
    Some(total / ADC_DEPTH as i32)
}

/// Mean of the middle four RPM values.
///
/// Interrupt latency occasionally produces a wild interval; sorting and
/// dropping the two highest and two lowest slots keeps one bad edge from
/// moving the display.
pub fn median_rpm(mut ring: [u32; RPM_SLOTS]) -> i32 {
    ring.sort_unstable();
    let middle = &ring[RPM_SLOTS / 2 - 2..RPM_SLOTS / 2 + 2];
    let total: u64 = middle.iter().map(|&r| u64::from(r)).sum();
    i32::try_from(total / middle.len() as u64).unwrap_or(i32::MAX)
}

fn linearize_analog(
    kind: SensorKind,
    average: i32,
) -> Option<i32> {
    match kind {
        SensorKind::Sender240To33 => Some(SENDER_240_33.interpolate(average)),
        SensorKind::Sender240To33Linear => scale(
            average + SENDER_LINEAR_OFFSET,
            1000,
            SENDER_LINEAR_FULL + SENDER_LINEAR_OFFSET,
        ),
        SensorKind::ThermistorC => Some(THERMISTOR.interpolate(average)),
        SensorKind::ThermistorF => {
            celsius_to_fahrenheit(THERMISTOR.interpolate(average), FAHRENHEIT_OFFSET_TENTHS)
        }
        SensorKind::Volts => scale(average, VOLTS_NUMERATOR, VOLTS_DENOMINATOR),
        _ => Some(average),
    }
}

fn linearize_thermocouple(
    kind: SensorKind,
    reading: i32,
    reference: Option<i32>,
) -> Option<i32> {
    let celsius = match kind {
        SensorKind::JTypeThermocoupleC | SensorKind::JTypeThermocoupleF => {
            let reference = reference?;
            scale(reading - reference, J_TYPE_NUMERATOR, J_TYPE_DENOMINATOR)? + reference
        }
        _ => reading,
    };
    match kind {
        SensorKind::JTypeThermocoupleF | SensorKind::KTypeThermocoupleF => {
            celsius_to_fahrenheit(celsius, FAHRENHEIT_OFFSET_QUARTERS)
        }
        _ => Some(celsius),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
