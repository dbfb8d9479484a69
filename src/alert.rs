//! Threshold classification of sensor readings.

use bitflags::bitflags;

use crate::fixed::scale;
use crate::frame::AlarmStatus;
use crate::sensor::{SCALE_DIVISOR, SensorDescriptor};

bitflags! {
    /// Alert bits for one reading. Low and high sides are independent.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct AlertFlags: u8 {
        const WARNING_LOW = 1 << 0;
        const CAUTION_LOW = 1 << 1;
        const CAUTION_HIGH = 1 << 2;
        const WARNING_HIGH = 1 << 3;
        /// The reading could not be taken.
        const FAULT = 1 << 4;

        const WARNING = Self::WARNING_LOW.bits() | Self::WARNING_HIGH.bits();
        const CAUTION = Self::CAUTION_LOW.bits() | Self::CAUTION_HIGH.bits();
    }
}

#[cfg(target_arch = "arm")]
impl defmt::Format for AlertFlags {
    fn format(
        &self,
        f: defmt::Formatter,
    ) {
        defmt::write!(f, "AlertFlags({=u8:#x})", self.bits());
    }
}

impl AlertFlags {
    /// Indicator pattern for this set of alerts.
    pub fn indicator(self) -> AlarmStatus {
        if self.intersects(Self::WARNING) {
            AlarmStatus::Alarm
        } else if self.intersects(Self::CAUTION | Self::FAULT) {
            AlarmStatus::Caution
        } else {
            AlarmStatus::Normal
        }
    }

    /// Combine the alerts of several readings.
    pub fn worst(flags: impl IntoIterator<Item = Self>) -> Self {
        flags.into_iter().fold(Self::empty(), |acc, f| acc | f)
    }
}

/// Reading in display units: `(reading + offset) * factor / SCALE_DIVISOR`.
pub fn scale_value(
    sensor: &SensorDescriptor,
    reading: Option<i32>,
) -> Option<i32> {
    let shifted = reading?.checked_add(sensor.offset)?;
    scale(shifted, sensor.factor, SCALE_DIVISOR)
}

/// Classify `reading` against the descriptor's bands.
pub fn classify(
    sensor: &SensorDescriptor,
    reading: Option<i32>,
) -> AlertFlags {
    let Some(value) = scale_value(sensor, reading) else {
        return AlertFlags::FAULT;
    };
    let bands = &sensor.thresholds;
    let mut flags = AlertFlags::empty();

    if value < bands.low_warning {
        flags |= AlertFlags::WARNING_LOW;
    } else if value < bands.low_caution {
        flags |= AlertFlags::CAUTION_LOW;
    }

    if value > bands.high_warning {
        flags |= AlertFlags::WARNING_HIGH;
    } else if value > bands.high_caution {
        flags |= AlertFlags::CAUTION_HIGH;
    }

    flags
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::{SensorKind, Thresholds, factor};

    fn oil_pressure() -> SensorDescriptor {
        SensorDescriptor::new(0, SensorKind::Sender240To33).with_thresholds(Thresholds {
            low_warning: 100,
            low_caution: 200,
            high_caution: 800,
            high_warning: 900,
        })
    }

    #[test]
    fn test_in_band_is_clear() {
        let sensor = oil_pressure();
        for value in [200, 500, 800] {
            assert_eq!(classify(&sensor, Some(value)), AlertFlags::empty(), "value {value}");
        }
    }

    #[test]
    fn test_low_side() {
        let sensor = oil_pressure();
        assert_eq!(classify(&sensor, Some(199)), AlertFlags::CAUTION_LOW);
        assert_eq!(classify(&sensor, Some(100)), AlertFlags::CAUTION_LOW);
        assert_eq!(classify(&sensor, Some(99)), AlertFlags::WARNING_LOW);
    }

    #[test]
    fn test_high_side() {
        let sensor = oil_pressure();
        assert_eq!(classify(&sensor, Some(801)), AlertFlags::CAUTION_HIGH);
        assert_eq!(classify(&sensor, Some(900)), AlertFlags::CAUTION_HIGH);
        assert_eq!(classify(&sensor, Some(901)), AlertFlags::WARNING_HIGH);
    }

    #[test]
    fn test_fault_sets_only_fault() {
        assert_eq!(classify(&oil_pressure(), None), AlertFlags::FAULT);
    }

    #[test]
    fn test_overlapping_bands_set_both_sides() {
        // unordered bands are rejected at compile time for real tables, but
        // classification itself treats each side independently
        let sensor = SensorDescriptor::new(0, SensorKind::Volts).with_thresholds(Thresholds {
            low_warning: 0,
            low_caution: 500,
            high_caution: 100,
            high_warning: 1000,
        });
        assert_eq!(
            classify(&sensor, Some(300)),
            AlertFlags::CAUTION_LOW | AlertFlags::CAUTION_HIGH
        );
    }

    #[test]
    fn test_classify_uses_scaled_value() {
        // 0.5x with +100 offset: raw 1000 -> 550
        let sensor = oil_pressure().scaled(factor(1, 2), 100);
        assert_eq!(scale_value(&sensor, Some(1000)), Some(550));
        assert_eq!(classify(&sensor, Some(1000)), AlertFlags::empty());
        assert_eq!(classify(&sensor, Some(1700)), AlertFlags::CAUTION_HIGH);
    }

    #[test]
    fn test_scale_value_overflow_is_fault() {
        let sensor = SensorDescriptor::new(0, SensorKind::Volts).scaled(SCALE_DIVISOR, 1);
        assert_eq!(scale_value(&sensor, Some(i32::MAX)), None);
    }

    #[test]
    fn test_indicator_priority() {
        assert_eq!(AlertFlags::empty().indicator(), AlarmStatus::Normal);
        assert_eq!(AlertFlags::CAUTION_HIGH.indicator(), AlarmStatus::Caution);
        assert_eq!(AlertFlags::FAULT.indicator(), AlarmStatus::Caution);
        assert_eq!(
            (AlertFlags::WARNING_LOW | AlertFlags::CAUTION_HIGH).indicator(),
            AlarmStatus::Alarm
        );
    }

    #[test]
    fn test_worst_combines() {
        let all = AlertFlags::worst([
            AlertFlags::empty(),
            AlertFlags::CAUTION_LOW,
            AlertFlags::FAULT,
        ]);
        assert_eq!(all, AlertFlags::CAUTION_LOW | AlertFlags::FAULT);
        assert_eq!(AlertFlags::worst([]), AlertFlags::empty());
    }
}
