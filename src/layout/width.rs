//! Display width of text in printer character cells.
//!
//! ASCII takes one cell. Characters the printer renders from its
//! double-byte (GBK) font take two. Characters GBK cannot represent print
//! as a single replacement glyph.

use encoding_rs::GBK;

/// Cells occupied by one character
pub fn char_width(c: char) -> usize {
    if c.is_ascii() {
        return 1;
    }
    let mut buf = [0u8; 4];
    let (encoded, _, had_errors) = GBK.encode(c.encode_utf8(&mut buf));
    if had_errors { 1 } else { encoded.len().clamp(1, 2) }
}

/// Cells occupied by a string
pub fn text_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}
