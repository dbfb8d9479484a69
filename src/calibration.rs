//! Transducer calibration data.
//!
//! Tables map averaged 10-bit ADC counts to physical units. Constants describe
//! the linear transforms used where a table is not needed.

use crate::interpolate::InterpolationTable;

// =============================================================================
// Thermistor (tenths of a degree Celsius)
// =============================================================================

/// Thermistor probe against its divider, ADC counts to tenths of °C.
///
/// Covers raw 64..=960; 150.0 °C at the low end, -5.8 °C at the high end.
pub const THERMISTOR: InterpolationTable = InterpolationTable {
    origin: 64,
    shifts: &[
        3, 3, 3, 3, 3, 3, 4, 4, //
        4, 4, 4, 4, 4, 5, 5, 5, //
        5, 5, 6, 6, 7, 6, 6, 5, //
        5, 5, 5, 4, 4, 4, 4,
    ],
    values: &[
        1500, 1438, 1384, 1336, 1293, 1254, 1219, 1155, //
        1100, 1051, 1008, 968, 932, 898, 838, 784, //
        736, 692, 650, 575, 505, 375, 310, 241, //
        204, 164, 121, 72, 44, 14, -19, -58,
    ],
};

const _: () = assert!(THERMISTOR.is_well_formed());
const _: () = assert!(THERMISTOR.end() < 1024);

// =============================================================================
// 240-33 Ohm resistive sender (per-mille of gauge span)
// =============================================================================

/// 240-33 Ω sender (fuel level, pressure) against a 240 Ω divider.
///
/// Output is per-mille of the gauge span, slightly over-ranged at both ends.
pub const SENDER_240_33: InterpolationTable = InterpolationTable {
    origin: 48,
    shifts: &[
        5, 5, 5, 5, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, //
        4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
    ],
    values: &[
        1105, 1064, 1019, 972, 921, 894, 866, //
        837, 806, 775, 742, 707, 671, 634, //
        595, 553, 510, 465, 417, 367, 314, //
        258, 199, 137, 70, 0, -75, -155,
    ],
};

const _: () = assert!(SENDER_240_33.is_well_formed());
const _: () = assert!(SENDER_240_33.end() < 1024);

/// ADC counts at which a 240-33 Ω sender reads empty, as a negative offset.
pub const SENDER_LINEAR_OFFSET: i32 = -495;

/// ADC counts at which a 240-33 Ω sender reads full.
pub const SENDER_LINEAR_FULL: i32 = 124;

// =============================================================================
// Raw voltage
// =============================================================================

/// Raw analog input scaled to per-mille of full scale: `v * 1000 / 1024`.
pub const VOLTS_NUMERATOR: i32 = 1000;
pub const VOLTS_DENOMINATOR: i32 = 1024;

// =============================================================================
// Thermocouples (quarter degrees Celsius)
// =============================================================================

/// Ratio of K-type to J-type Seebeck coefficient, in 1/32768ths.
///
/// The converter linearizes for K-type; a J-type probe reads this much of the
/// K-scaled difference from the reference junction.
pub const J_TYPE_NUMERATOR: i32 = 25_599;
pub const J_TYPE_DENOMINATOR: i32 = 32_768;

/// 32 °F in tenths of a degree, for thermistor readings.
pub const FAHRENHEIT_OFFSET_TENTHS: i32 = 32 * 10;

/// 32 °F in quarter degrees, for thermocouple readings.
pub const FAHRENHEIT_OFFSET_QUARTERS: i32 = 32 * 4;

// =============================================================================
// Fuel flow
// =============================================================================

/// Pulses counted over the fuel-flow window times this, divided by the
/// k-factor, gives tenths of a fuel unit per hour.
pub const FUEL_FLOW_MULTIPLIER: i32 = 10 * 3600 / 40 / 2;

// =============================================================================
// Unit Tests
// =============================================================================
