//! Sensor descriptors and channel resolution.
//!
//! A descriptor names where a reading comes from (`pin`), how to linearize it
//! (`kind`), how to scale it for display and alerting (`factor`, `offset`),
//! and its threshold bands. Descriptors are static configuration; several may
//! share one physical channel with different kinds.

use crate::fixed::div_round;
use crate::store::{ADC_CHANNELS, THERMOCOUPLE_PROBES};

// =============================================================================
// Channel map
// =============================================================================

/// High bit of a pin selecting the alternate mode of a dual-mode channel.
/// Masked off before the channel is resolved.
pub const DUAL_BIT: i16 = 0x80;

/// First thermocouple probe pin.
pub const THERMOCOUPLE_BASE: i16 = 16;

/// Engine hours.
pub const HOBBS_PIN: i16 = 24;

/// Fuel flow rate.
pub const FUEL_FLOW_PIN: i16 = 25;

/// Fuel remaining.
pub const FUEL_REMAINING_PIN: i16 = 26;

/// Tachometer.
pub const TACH_PIN: i16 = 27;

/// Pin of an absent sensor; always reads as a fault.
pub const NO_PIN: i16 = -1;

/// Where a resolved pin reads from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Channel {
    Analog(usize),
    Thermocouple(usize),
    Hobbs,
    FuelFlow,
    FuelRemaining,
    Tach,
}

impl Channel {
    /// Resolve `pin + sub_index`. Negative or unmapped pins are `None`.
    pub fn resolve(
        pin: i16,
        sub_index: u8,
    ) -> Option<Self> {
        let pin = pin.checked_add(i16::from(sub_index))?;
        if pin < 0 {
            return None;
        }
        let pin = pin & (DUAL_BIT - 1);
        let thermocouple_end = THERMOCOUPLE_BASE + THERMOCOUPLE_PROBES as i16;

        match pin {
            p if (p as usize) < ADC_CHANNELS => Some(Self::Analog(p as usize)),
            p if (THERMOCOUPLE_BASE..thermocouple_end).contains(&p) => {
                Some(Self::Thermocouple((p - THERMOCOUPLE_BASE) as usize))
            }
            HOBBS_PIN => Some(Self::Hobbs),
            FUEL_FLOW_PIN => Some(Self::FuelFlow),
            FUEL_REMAINING_PIN => Some(Self::FuelRemaining),
            TACH_PIN => Some(Self::Tach),
            _ => None,
        }
    }

    /// Whether `pin + 0 .. pin + count` all resolve inside the bank `pin`
    /// starts in. A span past the end of a bank would read whatever channel
    /// follows it.
    pub const fn span_fits(
        pin: i16,
        count: u8,
    ) -> bool {
        if pin < 0 || count == 0 {
            return count == 0;
        }
        let pin = pin & (DUAL_BIT - 1);
        let end = pin + count as i16;
        let thermocouple_end = THERMOCOUPLE_BASE + THERMOCOUPLE_PROBES as i16;
        if pin < ADC_CHANNELS as i16 {
            end <= ADC_CHANNELS as i16
        } else if pin >= THERMOCOUPLE_BASE && pin < thermocouple_end {
            end <= thermocouple_end
        } else {
            count == 1
        }
    }
}

// =============================================================================
// Sensor kinds
// =============================================================================

/// Transducer type; selects the linearization applied to the raw reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum SensorKind {
    /// Analog input as per-mille of full scale.
    Volts,
    /// 240-33 Ω sender through its calibration table.
    Sender240To33,
    /// 240-33 Ω sender treated as linear between its end points.
    Sender240To33Linear,
    ThermistorC,
    ThermistorF,
    JTypeThermocoupleC,
    JTypeThermocoupleF,
    KTypeThermocoupleC,
    KTypeThermocoupleF,
    Hours,
    FuelFlow,
    FuelRemaining,
    Tachometer,
}

// =============================================================================
// Thresholds and descriptors
// =============================================================================

/// Alert bands in scaled units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct Thresholds {
    pub low_warning: i32,
    pub low_caution: i32,
    pub high_caution: i32,
    pub high_warning: i32,
}

impl Thresholds {
    /// Bands that never alert.
    pub const NONE: Self = Self {
        low_warning: i32::MIN,
        low_caution: i32::MIN + 1,
        high_caution: i32::MAX - 1,
        high_warning: i32::MAX,
    };

    /// `low_warning < low_caution < high_caution < high_warning`.
    pub const fn is_ordered(&self) -> bool {
        self.low_warning < self.low_caution
            && self.low_caution < self.high_caution
            && self.high_caution < self.high_warning
    }
}

/// Denominator of [`SensorDescriptor::factor`].
pub const SCALE_DIVISOR: i32 = 1 << 10;

/// Express a rational display factor in `SCALE_DIVISOR` units, rounded.
pub const fn factor(
    numerator: i32,
    denominator: i32,
) -> i32 {
    div_round(numerator as i64 * SCALE_DIVISOR as i64, denominator as i64) as i32
}

/// Static description of one displayed sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct SensorDescriptor {
    pub pin: i16,
    pub kind: SensorKind,
    /// Display scale in `1 / SCALE_DIVISOR` units.
    pub factor: i32,
    /// Added to the reading before scaling.
    pub offset: i32,
    pub thresholds: Thresholds,
}

impl SensorDescriptor {
    /// Descriptor with unit scale and no alert bands.
    pub const fn new(
        pin: i16,
        kind: SensorKind,
    ) -> Self {
        Self {
            pin,
            kind,
            factor: SCALE_DIVISOR,
            offset: 0,
            thresholds: Thresholds::NONE,
        }
    }

    pub const fn scaled(
        mut self,
        factor: i32,
        offset: i32,
    ) -> Self {
        self.factor = factor;
        self.offset = offset;
        self
    }

    pub const fn with_thresholds(
        mut self,
        thresholds: Thresholds,
    ) -> Self {
        self.thresholds = thresholds;
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
