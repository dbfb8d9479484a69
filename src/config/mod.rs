//! Application configuration.
//!
//! - Timing: tick cadence and the derived fuel-window and hobbs cadences
//! - Tachometer and display constants
//! - `sensors`: the installation's sensor descriptors and run criteria

pub mod sensors;

// =============================================================================
// Timing
// =============================================================================

/// Periodic tick period. Every tick samples all analog channels.
pub const TICK_MS: u64 = 125;

/// Fuel-flow window length. The rate is counted over four windows.
pub const FUEL_WINDOW_MS: u64 = 500;

/// Hobbs pre-load decrement period.
pub const HOBBS_STEP_MS: u64 = 1000;

/// Ticks between fuel-window advances.
pub const FUEL_WINDOW_TICKS: u16 = (FUEL_WINDOW_MS / TICK_MS) as u16;

/// Ticks between hobbs pre-load decrements.
pub const HOBBS_TICKS: u16 = (HOBBS_STEP_MS / TICK_MS) as u16;

/// Hobbs pre-load steps per persisted hobbs tick (40 ticks per hour).
pub const HOBBS_COUNT_INTERVAL: u16 = 3600 / 40;

/// Main-loop period for the tach activity check.
pub const TACH_CHECK_MS: u64 = 500;

/// Main-loop render period.
pub const RENDER_MS: u64 = 250;

/// How long each line-1 page stays up.
pub const PAGE_MS: u64 = 3000;

/// Minimum spacing of status writes to flash. Changes between writes are
/// batched; the startup half-interval compensation covers what a power cut
/// loses.
pub const COMMIT_MS: u64 = 60_000;

const _: () = assert!(FUEL_WINDOW_MS % TICK_MS == 0);
const _: () = assert!(HOBBS_STEP_MS % TICK_MS == 0);
const _: () = assert!(FUEL_WINDOW_TICKS > 0 && HOBBS_TICKS > 0);
const _: () = assert!(HOBBS_COUNT_INTERVAL as u64 * HOBBS_STEP_MS == 90_000);
const _: () = assert!(TACH_CHECK_MS % RENDER_MS == 0);

// =============================================================================
// Tachometer
// =============================================================================

/// Tach pulses per crankshaft revolution.
pub const TACH_DIVIDER: u32 = 2;

/// Microseconds per minute over pulses per revolution; divided by the pulse
/// interval this gives RPM.
pub const RPM_NUMERATOR: u32 = 60_000_000 / TACH_DIVIDER;

// =============================================================================
// Display
// =============================================================================

/// 7-bit bus address of display line 0; line 1 is `DISPLAY_BASE_ADDRESS | 1`.
pub const DISPLAY_BASE_ADDRESS: u8 = 0x70;

/// Brightness sent at configuration, `0..=15`.
pub const DISPLAY_BRIGHTNESS: u8 = 15;

const _: () = assert!(DISPLAY_BRIGHTNESS <= 15);
const _: () = assert!(DISPLAY_BASE_ADDRESS & 1 == 0);

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::assertions_on_constants)] // Intentional validation of derived constants
mod tests {
    use super::*;

    #[test]
    fn test_derived_cadences() {
        assert_eq!(FUEL_WINDOW_TICKS, 4);
        assert_eq!(HOBBS_TICKS, 8);
        assert_eq!(HOBBS_COUNT_INTERVAL, 90);
    }

    #[test]
    fn test_rpm_numerator() {
        // 2 pulses per rev, 10 ms between pulses -> 3000 RPM
        assert_eq!(RPM_NUMERATOR / 10_000, 3000);
    }
}
