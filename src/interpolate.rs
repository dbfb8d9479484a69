//! Piecewise-linear lookup tables for non-linear transducers.
//!
//! A table is stored compactly: the raw value of the first breakpoint, one
//! step shift per segment (segment `i` is `1 << shifts[i]` raw units wide),
//! and one output value per breakpoint. Breakpoint positions are rebuilt by
//! summing segment widths, so they are strictly increasing by construction and
//! dense where the transducer curve bends.

use crate::fixed::div_round;

/// Monotonic piecewise-linear mapping from raw ADC counts to a physical value.
#[derive(Clone, Copy, Debug)]
pub struct InterpolationTable {
    /// Raw value of the first breakpoint.
    pub origin: i32,
    /// Width of each segment as a power of two.
    pub shifts: &'static [u8],
    /// Output at each breakpoint, `shifts.len() + 1` entries.
    pub values: &'static [i32],
}

impl InterpolationTable {
    /// Check the table shape: one more value than segments, and every segment
    /// width representable.
    pub const fn is_well_formed(&self) -> bool {
        if self.values.len() != self.shifts.len() + 1 {
            return false;
        }
        let mut i = 0;
        while i < self.shifts.len() {
            if self.shifts[i] > 30 {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Raw value of the last breakpoint.
    pub const fn end(&self) -> i32 {
        let mut position = self.origin;
        let mut i = 0;
        while i < self.shifts.len() {
            position += 1 << self.shifts[i];
            i += 1;
        }
        position
    }

    /// Map `raw` through the table, clamping outside the breakpoint range.
    pub fn interpolate(
        &self,
        raw: i32,
    ) -> i32 {
        let Some(&first) = self.values.first() else {
            return 0;
        };
        if raw <= self.origin {
            return first;
        }

        let mut position = self.origin;
        for (&shift, pair) in self.shifts.iter().zip(self.values.windows(2)) {
            let width = 1i32 << shift;
            if raw < position + width {
                let rise = i64::from(pair[1] - pair[0]);
                let run = i64::from(raw - position);
                return pair[0] + div_round(rise * run, i64::from(width)) as i32;
            }
            // an exact hit on the next breakpoint is handled by the next segment
            position += width;
        }

        self.values.last().copied().unwrap_or(first)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Breakpoints at 10, 14, 22, 38 (widths 4, 8, 16).
    const RISING: InterpolationTable = InterpolationTable {
        origin: 10,
        shifts: &[2, 3, 4],
        values: &[0, 100, 300, 400],
    };

    /// Breakpoints at 0, 8, 16 with falling output.
    const FALLING: InterpolationTable = InterpolationTable {
        origin: 0,
        shifts: &[3, 3],
        values: &[1000, 200, -600],
    };

    fn breakpoints(table: &InterpolationTable) -> Vec<i32> {
        let mut points = vec![table.origin];
        let mut position = table.origin;
        for &shift in table.shifts {
            position += 1 << shift;
            points.push(position);
        }
        points
    }

    #[test]
    fn test_well_formed() {
        assert!(RISING.is_well_formed());
        assert!(FALLING.is_well_formed());
        let short = InterpolationTable {
            origin: 0,
            shifts: &[1, 1],
            values: &[1, 2],
        };
        assert!(!short.is_well_formed());
    }

    #[test]
    fn test_end_is_sum_of_widths() {
        assert_eq!(RISING.end(), 38);
        assert_eq!(FALLING.end(), 16);
    }

    #[test]
    fn test_exact_at_every_breakpoint() {
        for table in [RISING, FALLING] {
            for (raw, &expected) in breakpoints(&table).into_iter().zip(table.values) {
                assert_eq!(table.interpolate(raw), expected, "breakpoint at raw {raw}");
            }
        }
    }

    #[test]
    fn test_clamps_below_first_breakpoint() {
        assert_eq!(RISING.interpolate(9), 0);
        assert_eq!(RISING.interpolate(-500), 0);
        assert_eq!(FALLING.interpolate(-1), 1000);
    }

    #[test]
    fn test_clamps_above_last_breakpoint() {
        assert_eq!(RISING.interpolate(39), 400);
        assert_eq!(RISING.interpolate(10_000), 400);
        assert_eq!(FALLING.interpolate(17), -600);
    }

    #[test]
    fn test_midpoints_blend_linearly() {
        // halfway through the 8-wide segment 14..22 (100 -> 300)
        assert_eq!(RISING.interpolate(18), 200);
        // a quarter into the first segment of the falling table (1000 -> 200)
        assert_eq!(FALLING.interpolate(2), 800);
    }

    #[test]
    fn test_strictly_between_differing_neighbours() {
        for raw in 11..14 {
            let v = RISING.interpolate(raw);
            assert!(v > 0 && v < 100, "raw {raw} gave {v}");
        }
        for raw in 9..16 {
            let v = FALLING.interpolate(raw);
            assert!(v < 200 && v > -600, "raw {raw} gave {v}");
        }
    }

    #[test]
    fn test_monotonic_table_gives_monotonic_output() {
        let mut previous = RISING.interpolate(0);
        for raw in 1..50 {
            let v = RISING.interpolate(raw);
            assert!(v >= previous);
            previous = v;
        }
        let mut previous = FALLING.interpolate(-5);
        for raw in -4..25 {
            let v = FALLING.interpolate(raw);
            assert!(v <= previous);
            previous = v;
        }
    }
}
