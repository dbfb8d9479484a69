//! Engine-running detection.
//!
//! Hobbs time accumulates only while the engine runs. Running is inferred from
//! sensors: battery voltage above the alternator set point, oil pressure, or
//! RPM.

use crate::alert::scale_value;
use crate::reader::SensorReader;
use crate::sensor::SensorDescriptor;

/// The engine runs when `sensor` scales to more than `above`.
#[derive(Clone, Copy, Debug)]
pub struct RunCriterion {
    pub sensor: &'static SensorDescriptor,
    pub above: i32,
}

/// Set of criteria, any one of which means the engine is running.
pub type RunCriteria = &'static [RunCriterion];

/// Whether the engine is running.
///
/// With no criteria configured the engine always counts as running, so hours
/// accumulate for as long as the cluster is powered. A faulted sensor never
/// satisfies its criterion.
pub fn is_engine_running(
    reader: &SensorReader<'_>,
    criteria: &[RunCriterion],
) -> bool {
    if criteria.is_empty() {
        return true;
    }
    criteria.iter().any(|criterion| {
        let value = scale_value(criterion.sensor, reader.read(criterion.sensor, 0));
        matches!(value, Some(v) if v > criterion.above)
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
