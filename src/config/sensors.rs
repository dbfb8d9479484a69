//! Sensor installation for a four-cylinder aircraft engine.
//!
//! Display units after scaling:
//!
//! | Sensor | Unit | Source |
//! |--------|------|--------|
//! | volts | 0.1 V | 0-20 V divider on A0 |
//! | oil pressure | psi | 240-33 Ω, 0-100 psi sender on A1 |
//! | oil temperature | °F | thermistor on A2 |
//! | fuel pressure | 0.1 psi | 240-33 Ω, 0-15 psi sender on A3 |
//! | fuel left / right | 0.1 gal | 240-33 Ω, 16 gal float senders on A4/A5 |
//! | CHT 1-4 | °F | K-type probes 0-3 |
//! | EGT 1-4 | °F | K-type probes 4-7 |
//! | RPM, hours, fuel flow, fuel remaining | native | pulse inputs / status |

use crate::engine::{RunCriteria, RunCriterion};
use crate::pages::{Page, Watch};
use crate::sensor::{
    Channel,
    FUEL_FLOW_PIN,
    FUEL_REMAINING_PIN,
    HOBBS_PIN,
    SensorDescriptor,
    SensorKind,
    TACH_PIN,
    THERMOCOUPLE_BASE,
    Thresholds,
    factor,
};

/// Cylinders, and so probes per thermocouple bank.
pub const CYLINDERS: u8 = 4;

const fn high_only(
    caution: i32,
    warning: i32,
) -> Thresholds {
    Thresholds {
        low_warning: i32::MIN,
        low_caution: i32::MIN + 1,
        high_caution: caution,
        high_warning: warning,
    }
}

const fn low_only(
    warning: i32,
    caution: i32,
) -> Thresholds {
    Thresholds {
        low_warning: warning,
        low_caution: caution,
        high_caution: i32::MAX - 1,
        high_warning: i32::MAX,
    }
}

// =============================================================================
// Descriptors
// =============================================================================

pub const VOLTS: SensorDescriptor = SensorDescriptor::new(0, SensorKind::Volts)
    .scaled(factor(1, 5), 0)
    .with_thresholds(Thresholds {
        low_warning: 115,
        low_caution: 125,
        high_caution: 148,
        high_warning: 152,
    });

pub const OIL_PRESSURE: SensorDescriptor = SensorDescriptor::new(1, SensorKind::Sender240To33)
    .scaled(factor(1, 10), 0)
    .with_thresholds(Thresholds {
        low_warning: 15,
        low_caution: 25,
        high_caution: 95,
        high_warning: 100,
    });

pub const OIL_TEMPERATURE: SensorDescriptor = SensorDescriptor::new(2, SensorKind::ThermistorF)
    .scaled(factor(1, 10), 0)
    .with_thresholds(Thresholds {
        low_warning: 40,
        low_caution: 100,
        high_caution: 235,
        high_warning: 245,
    });

pub const FUEL_PRESSURE: SensorDescriptor = SensorDescriptor::new(3, SensorKind::Sender240To33)
    .scaled(factor(3, 20), 0)
    .with_thresholds(Thresholds {
        low_warning: 5,
        low_caution: 10,
        high_caution: 80,
        high_warning: 90,
    });

pub const FUEL_LEFT: SensorDescriptor = SensorDescriptor::new(4, SensorKind::Sender240To33Linear)
    .scaled(factor(4, 25), 0)
    .with_thresholds(low_only(20, 50));

pub const FUEL_RIGHT: SensorDescriptor = SensorDescriptor::new(5, SensorKind::Sender240To33Linear)
    .scaled(factor(4, 25), 0)
    .with_thresholds(low_only(20, 50));

pub const CHT: SensorDescriptor = SensorDescriptor::new(THERMOCOUPLE_BASE, SensorKind::KTypeThermocoupleF)
    .scaled(factor(1, 4), 0)
    .with_thresholds(high_only(435, 460));

pub const EGT: SensorDescriptor =
    SensorDescriptor::new(THERMOCOUPLE_BASE + CYLINDERS as i16, SensorKind::KTypeThermocoupleF)
        .scaled(factor(1, 4), 0);

pub const TACH: SensorDescriptor =
    SensorDescriptor::new(TACH_PIN, SensorKind::Tachometer).with_thresholds(high_only(2700, 2800));

pub const HOURS: SensorDescriptor = SensorDescriptor::new(HOBBS_PIN, SensorKind::Hours);

pub const FUEL_FLOW: SensorDescriptor = SensorDescriptor::new(FUEL_FLOW_PIN, SensorKind::FuelFlow);

pub const FUEL_REMAINING: SensorDescriptor =
    SensorDescriptor::new(FUEL_REMAINING_PIN, SensorKind::FuelRemaining)
        .with_thresholds(low_only(50, 100));

const ALL: [SensorDescriptor; 12] = [
    VOLTS,
    OIL_PRESSURE,
    OIL_TEMPERATURE,
    FUEL_PRESSURE,
    FUEL_LEFT,
    FUEL_RIGHT,
    CHT,
    EGT,
    TACH,
    HOURS,
    FUEL_FLOW,
    FUEL_REMAINING,
];

const fn all_ordered(sensors: &[SensorDescriptor]) -> bool {
    let mut i = 0;
    while i < sensors.len() {
        if !sensors[i].thresholds.is_ordered() {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(all_ordered(&ALL), "threshold bands must be strictly ordered");

// =============================================================================
// Display and engine-state wiring
// =============================================================================

/// Shown on line 0 next to the indicator.
pub const HEADLINE: &SensorDescriptor = &TACH;

/// Line 1 rotation.
pub const PAGES: &[Page] = &[
    Page::DualGauge {
        left: &FUEL_LEFT,
        right: &FUEL_RIGHT,
    },
    Page::Number {
        sensor: &VOLTS,
        decimal: 1,
    },
    Page::Number {
        sensor: &OIL_PRESSURE,
        decimal: 0,
    },
    Page::Number {
        sensor: &OIL_TEMPERATURE,
        decimal: 0,
    },
    Page::Number {
        sensor: &FUEL_FLOW,
        decimal: 1,
    },
    Page::Number {
        sensor: &FUEL_REMAINING,
        decimal: 1,
    },
    Page::Number {
        sensor: &HOURS,
        decimal: 1,
    },
];

/// Sensors that drive the alarm indicator.
pub const WATCHED: &[Watch] = &[
    Watch::single(&VOLTS),
    Watch::single(&OIL_PRESSURE),
    Watch::single(&OIL_TEMPERATURE),
    Watch::single(&FUEL_PRESSURE),
    Watch::single(&FUEL_LEFT),
    Watch::single(&FUEL_RIGHT),
    Watch {
        sensor: &CHT,
        channels: CYLINDERS,
    },
    Watch::single(&TACH),
];

const fn watches_fit(watched: &[Watch]) -> bool {
    let mut i = 0;
    while i < watched.len() {
        if !Channel::span_fits(watched[i].sensor.pin, watched[i].channels) {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(watches_fit(WATCHED), "a watched span runs past its bank");

/// Engine counts as running above 13.2 V (alternator charging), 10 psi oil
/// pressure or 300 RPM.
pub const RUN_CRITERIA: RunCriteria = &[
    RunCriterion {
        sensor: &VOLTS,
        above: 132,
    },
    RunCriterion {
        sensor: &OIL_PRESSURE,
        above: 10,
    },
    RunCriterion {
        sensor: &TACH,
        above: 300,
    },
];

// =============================================================================
// Unit Tests
// =============================================================================
