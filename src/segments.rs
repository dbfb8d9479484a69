//! Seven-segment glyphs.
//!
//! Segment bits, hexadecimal:
//!
//! ```text
//!  +---  1 ---+
//!  |          |
//!  20         2
//!  |          |
//!  +--- 40 ---+
//!  |          |
//!  10         4
//!  |          |
//!  +---  8 ---+ *80
//! ```

/// Glyphs for `0..=9`.
pub const DIGITS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

pub const DECIMAL_POINT: u8 = 0x80;
pub const MINUS: u8 = 0x40;
pub const BLANK: u8 = 0x00;

/// Letters a seven-segment digit can show, in the case that reads best.
/// Where only one case is drawable, [`glyph`] falls back to it.
const LETTERS: &[(u8, u8)] = &[
    (b'A', 0x77),
    (b'a', 0x77),
    (b'B', 0x7C),
    (b'b', 0x7C),
    (b'C', 0x39),
    (b'c', 0x58),
    (b'D', 0x5E),
    (b'd', 0x5E),
    (b'E', 0x79),
    (b'F', 0x71),
    (b'f', 0x71),
    (b'G', 0x3B),
    (b'g', 0x6F),
    (b'H', 0x76),
    (b'h', 0x74),
    (b'i', 0x04),
    (b'J', 0x1E),
    (b'j', 0x1E),
    (b'L', 0x38),
    (b'n', 0x54),
    (b'O', 0x3F),
    (b'o', 0x5C),
    (b'P', 0x73),
    (b'r', 0x50),
    (b'S', 0x6D),
    (b's', 0x6D),
    (b'T', 0x78),
    (b't', 0x78),
    (b'U', 0x3E),
    (b'u', 0x1C),
    (b'V', 0x3E),
    (b'v', 0x1C),
    (b'Y', 0x6E),
    (b'y', 0x6E),
    (b'z', 0x5B),
];

/// ASCII lookup built at compile time. Zero means "no glyph".
const ASCII: [u8; 128] = {
    let mut table = [BLANK; 128];
    let mut d = 0;
    while d < DIGITS.len() {
        table[b'0' as usize + d] = DIGITS[d];
        d += 1;
    }
    let mut i = 0;
    while i < LETTERS.len() {
        table[LETTERS[i].0 as usize] = LETTERS[i].1;
        i += 1;
    }
    table[b'-' as usize] = MINUS;
    table[b'_' as usize] = 0x08;
    table
};

/// Glyph for an ASCII byte. Letters with no glyph in one case borrow the
/// other case; anything undrawable is blank.
pub const fn glyph(c: u8) -> u8 {
    if c >= 128 {
        return BLANK;
    }
    let exact = ASCII[c as usize];
    if exact != BLANK || !c.is_ascii_alphabetic() {
        return exact;
    }
    ASCII[(c ^ 0x20) as usize]
}

/// Four glyphs from a short ASCII label.
///
/// A `.` sets the decimal point of the glyph before it. Labels shorter than
/// four glyphs are padded with blanks on the right; extra glyphs are dropped.
pub const fn text(label: &str) -> [u8; 4] {
    let bytes = label.as_bytes();
    let mut out = [BLANK; 4];
    let mut filled = 0;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c == b'.' {
            // a leading point has nothing to attach to
            if filled > 0 {
                out[filled - 1] |= DECIMAL_POINT;
            }
        } else if filled < out.len() {
            out[filled] = glyph(c);
            filled += 1;
        }
        i += 1;
    }
    out
}

/// Shown in place of a number when its sensor is faulted.
pub const INOP: [u8; 4] = text("inoP");

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits() {
        assert_eq!(glyph(b'0'), 0x3F);
        assert_eq!(glyph(b'8'), 0x7F);
        assert_eq!(glyph(b'9'), 0x6F);
    }

    #[test]
    fn test_inop() {
        assert_eq!(INOP, [0x04, 0x54, 0x5C, 0x73]);
    }

    #[test]
    fn test_case_fallback() {
        // only lowercase n and uppercase P are drawable
        assert_eq!(glyph(b'N'), glyph(b'n'));
        assert_eq!(glyph(b'p'), glyph(b'P'));
        // both cases have their own glyph
        assert_ne!(glyph(b'C'), glyph(b'c'));
    }

    #[test]
    fn test_undrawable_is_blank() {
        assert_eq!(glyph(b'W'), BLANK);
        assert_eq!(glyph(b'?'), BLANK);
        assert_eq!(glyph(0xFF), BLANK);
        assert_eq!(glyph(b' '), BLANK);
    }

    #[test]
    fn test_text_pads_and_truncates() {
        assert_eq!(text("Hi"), [0x76, 0x04, BLANK, BLANK]);
        assert_eq!(text("FUEL5"), text("FUEL"));
    }

    #[test]
    fn test_text_decimal_point() {
        assert_eq!(text("1.5"), [0x06 | DECIMAL_POINT, 0x6D, BLANK, BLANK]);
        assert_eq!(text(".5"), [0x6D, BLANK, BLANK, BLANK]);
        assert_eq!(text("..inoP"), INOP);
    }
}
