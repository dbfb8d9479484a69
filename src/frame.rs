//! HT16K33 display RAM images.
//!
//! A frame is the 17-byte write that refreshes one display line: the RAM start
//! address (always 0) followed by the 16 RAM bytes. Each of the four digits
//! uses the low byte of a RAM row, and the colon sits in the row between digit
//! 2 and digit 3. On line 0 the high bytes of rows 0..=3 drive the two-color
//! alarm indicator.

use crate::config::DISPLAY_BASE_ADDRESS;
use crate::segments::{DECIMAL_POINT, DIGITS, INOP, MINUS};

/// Bytes in one frame write.
pub const FRAME_LEN: usize = 17;

/// Frame offsets of the four digits, left to right.
pub const DIGIT_SLOTS: [usize; 4] = [1, 3, 7, 9];

const COLON_SLOT: usize = 5;
const COLON_ON: u8 = 0x02;

/// Indicator slots lit with the full status pattern.
const STATUS_SLOTS: [usize; 2] = [2, 10];
/// Indicator slots that stay green for caution.
const HALF_STATUS_SLOTS: [usize; 2] = [6, 14];

/// Largest value a four-digit number can show.
const NUMBER_MAX: i32 = 9_999;
/// Largest value a two-digit gauge half accepts, in tenths.
const HALF_MAX: i32 = 999;

// =============================================================================
// Lines and indicator
// =============================================================================

/// One of the two display lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Line {
    Upper = 0,
    Lower = 1,
}

impl Line {
    pub const ALL: [Self; 2] = [Self::Upper, Self::Lower];

    /// 7-bit bus address of this line's controller.
    pub const fn address(self) -> u8 { DISPLAY_BASE_ADDRESS | self as u8 }
}

/// Indicator pattern shown on line 0.
///
/// Bit 0 is green and bit 2 red. Caution lights red on half the indicator
/// slots and alarm on all of them, so the severity order is visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
#[repr(u8)]
pub enum AlarmStatus {
    Normal = 0x01,
    Caution = 0x05,
    Alarm = 0x04,
}

impl AlarmStatus {
    const fn full(self) -> u8 { self as u8 }

    const fn half(self) -> u8 {
        match self {
            Self::Caution => Self::Normal as u8,
            other => other as u8,
        }
    }
}

// =============================================================================
// Frame
// =============================================================================

/// Display RAM image for one line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedFrame([u8; FRAME_LEN]);

impl Default for LedFrame {
    fn default() -> Self { Self::blank() }
}

impl LedFrame {
    /// All segments off.
    pub const fn blank() -> Self { Self([0; FRAME_LEN]) }

    /// Blank frame carrying the indicator pattern when `line` has one.
    fn with_status(
        line: Line,
        status: AlarmStatus,
    ) -> Self {
        let mut frame = Self::blank();
        if line == Line::Upper {
            for slot in STATUS_SLOTS {
                frame.0[slot] = status.full();
            }
            for slot in HALF_STATUS_SLOTS {
                frame.0[slot] = status.half();
            }
        }
        frame
    }

    /// A right-aligned number with `decimal` digits after the point.
    ///
    /// Values clamp to `0..=9999`; leading zeros are blank. A faulted reading
    /// shows `inoP`.
    pub fn number(
        line: Line,
        status: AlarmStatus,
        value: Option<i32>,
        decimal: u8,
    ) -> Self {
        let Some(value) = value else {
            return Self::text(line, status, INOP, false);
        };
        let mut frame = Self::with_status(line, status);
        frame.put_digits(DIGIT_SLOTS.len(), value.clamp(0, NUMBER_MAX) as u32);
        if decimal != 0
            && let Some(index) = (DIGIT_SLOTS.len() - 1).checked_sub(usize::from(decimal))
        {
            frame.0[DIGIT_SLOTS[index]] |= DECIMAL_POINT;
        }
        frame
    }

    /// Two half-width gauges separated by the colon, e.g. left and right tank.
    ///
    /// Each half takes tenths in `0..=999`. Below 100 it shows two digits with
    /// a decimal point; from 100 it shows whole units. A fault shows `--`.
    pub fn dual_gauge(
        left: Option<i32>,
        right: Option<i32>,
    ) -> Self {
        let mut frame = Self::blank();
        frame.put_half(2, left);
        frame.put_half(4, right);
        frame.0[COLON_SLOT] = COLON_ON;
        frame
    }

    /// Four raw glyphs.
    pub fn text(
        line: Line,
        status: AlarmStatus,
        glyphs: [u8; 4],
        colon: bool,
    ) -> Self {
        let mut frame = Self::with_status(line, status);
        for (slot, glyph) in DIGIT_SLOTS.into_iter().zip(glyphs) {
            frame.0[slot] = glyph;
        }
        if colon {
            frame.0[COLON_SLOT] = COLON_ON;
        }
        frame
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] { &self.0 }

    /// The four digit glyphs, left to right.
    pub fn digits(&self) -> [u8; 4] { DIGIT_SLOTS.map(|slot| self.0[slot]) }

    pub fn colon(&self) -> bool { self.0[COLON_SLOT] & COLON_ON != 0 }

    /// Write `value` right-aligned ending at digit `end - 1`, stopping once the
    /// remaining value is zero so leading positions stay blank.
    fn put_digits(
        &mut self,
        end: usize,
        mut value: u32,
    ) {
        for &slot in DIGIT_SLOTS[..end].iter().rev() {
            self.0[slot] = DIGITS[(value % 10) as usize];
            value /= 10;
            if value == 0 {
                break;
            }
        }
    }

    fn put_half(
        &mut self,
        end: usize,
        value: Option<i32>,
    ) {
        let Some(value) = value else {
            self.0[DIGIT_SLOTS[end - 1]] = MINUS;
            self.0[DIGIT_SLOTS[end - 2]] = MINUS;
            return;
        };
        let value = value.clamp(0, HALF_MAX) as u32;
        if value < 100 {
            self.put_digits(end, value);
            self.0[DIGIT_SLOTS[end - 2]] |= DECIMAL_POINT;
        } else {
            self.put_digits(end, value / 10);
        }
    }
}

impl AsRef<[u8]> for LedFrame {
    fn as_ref(&self) -> &[u8] { &self.0 }
}

// =============================================================================
// Unit Tests
// =============================================================================
