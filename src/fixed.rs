//! Fixed-point scaling without floating point.
//!
//! Every conversion in the sensor pipeline is a multiply-then-divide on
//! integers. The product is formed in 64 bits so that a 32-bit value times a
//! calibration constant never overflows, and the quotient is rounded to the
//! nearest integer (halves up, toward positive infinity) so repeated
//! conversions do not drift toward zero the way truncation does.
//!
//! Faults are `None`. A stage that receives `None` returns `None`; callers
//! chain stages with `Option::and_then`.

/// Divide with rounding to nearest, halves up: `floor((2n + d) / 2d)`.
///
/// `denominator` must be non-zero; [`scale`] checks this before calling.
#[inline]
pub(crate) const fn div_round(
    numerator: i64,
    denominator: i64,
) -> i64 {
    // widened so doubling a full 64-bit product cannot overflow
    let (n, d) = if denominator < 0 {
        (-(numerator as i128), -(denominator as i128))
    } else {
        (numerator as i128, denominator as i128)
    };
    (2 * n + d).div_euclid(2 * d) as i64
}

/// Compute `value * numerator / denominator`, rounded to nearest.
///
/// Returns `None` for a zero denominator or a result outside `i32`.
///
/// ```
/// use enguino_cluster::fixed::scale;
///
/// assert_eq!(scale(5, 1, 2), Some(3));
/// assert_eq!(scale(4, 1, 2), Some(2));
/// assert_eq!(scale(700, 10, 1), Some(7000));
/// ```
#[inline]
pub const fn scale(
    value: i32,
    numerator: i32,
    denominator: i32,
) -> Option<i32> {
    if denominator == 0 {
        return None;
    }
    let result = div_round(value as i64 * numerator as i64, denominator as i64);
    if result > i32::MAX as i64 || result < i32::MIN as i64 {
        None
    } else {
        Some(result as i32)
    }
}

/// Convert a Celsius reading to Fahrenheit at the same resolution.
///
/// `offset` is 32 °F expressed in the reading's units: 320 for tenths of a
/// degree, 128 for quarter degrees.
#[inline]
pub const fn celsius_to_fahrenheit(
    value: i32,
    offset: i32,
) -> Option<i32> {
    match scale(value, 9, 5) {
        Some(v) => v.checked_add(offset),
        None => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_denominator_is_plain_multiply() {
        for v in [-1000, -1, 0, 1, 7, 1234] {
            assert_eq!(scale(v, 13, 1), Some(v * 13));
        }
    }

    #[test]
    fn test_rounds_half_up() {
        assert_eq!(scale(5, 1, 2), Some(3));
        assert_eq!(scale(4, 1, 2), Some(2));
        assert_eq!(scale(1, 1, 3), Some(0));
        assert_eq!(scale(2, 1, 3), Some(1));
    }

    #[test]
    fn test_negative_halves_round_up() {
        // -2.5 -> -2, -2.6 -> -3
        assert_eq!(scale(-5, 1, 2), Some(-2));
        assert_eq!(scale(5, -1, 2), Some(-2));
        assert_eq!(scale(5, 1, -2), Some(-2));
        assert_eq!(scale(-5, 1, -2), Some(3));
        assert_eq!(scale(-13, 1, 5), Some(-3));
        assert_eq!(scale(-7, 1, 3), Some(-2));
    }


    #[test]
    fn test_wide_intermediate_does_not_overflow() {
        // 1_000_000 * 25_599 overflows i32 but not the 64-bit product
        assert_eq!(scale(1_000_000, 25_599, 32_768), Some(781_219));
    }

    #[test]
    fn test_zero_denominator_faults() {
        assert_eq!(scale(10, 1, 0), None);
    }

    #[test]
    fn test_result_out_of_range_faults() {
        assert_eq!(scale(i32::MAX, 2, 1), None);
        assert_eq!(scale(i32::MIN, 2, 1), None);
    }

    #[test]
    fn test_celsius_to_fahrenheit() {
        // 100.0 C in tenths -> 212.0 F in tenths
        assert_eq!(celsius_to_fahrenheit(1000, 320), Some(2120));
        // 0 C in quarter degrees -> 32 F in quarter degrees
        assert_eq!(celsius_to_fahrenheit(0, 128), Some(128));
        // -40 is the same in both scales
        assert_eq!(celsius_to_fahrenheit(-400, 320), Some(-400));
    }

    #[test]
    fn test_fault_propagates_through_chained_stages() {
        let fault: Option<i32> = None;
        assert_eq!(fault.and_then(|v| scale(v, 3, 2)), None);
        assert_eq!(fault.and_then(|v| celsius_to_fahrenheit(v, 320)), None);
    }
}
