//! Standard Helvetica-Bold font metrics.
//!
//! The watermark uses the PDF base-14 font Helvetica-Bold with
//! WinAnsiEncoding, so nothing is embedded in the output. Glyph advance
//! widths come from the Adobe AFM metrics and are expressed in 1/1000 em.

/// PostScript name of the watermark font.
pub const FONT_NAME: &str = "Helvetica-Bold";

/// Encoding declared in the font dictionary.
pub const FONT_ENCODING: &str = "WinAnsiEncoding";

/// Byte substituted for characters the encoding cannot represent.
pub const REPLACEMENT: u8 = b'?';

// Codes 32..=126
const ASCII_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // space../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    333, 333, 584, 584, 584, 611, 975, // :..@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    333, 278, 333, 584, 556, 333, // [..`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a..m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n..z
    389, 280, 389, 584, // {..~
];

// Codes 160..=255
const LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

/// Encode text into single-byte WinAnsi codes.
///
/// Printable ASCII and Latin-1 map to themselves, whitespace becomes a
/// space, and anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ if c.is_whitespace() => b' ',
            _ => REPLACEMENT,
        })
        .collect()
}

/// Advance width of an encoded glyph in 1/1000 em.
pub fn glyph_width(code: u8) -> u16 {
    match code {
        0x20..=0x7E => ASCII_WIDTHS[(code - 0x20) as usize],
        0xA0..=0xFF => LATIN1_WIDTHS[(code - 0xA0) as usize],
        _ => glyph_width(REPLACEMENT),
    }
}

/// Width of `text` in points when set at `font_size`.
pub fn measure_text(text: &str, font_size: f32) -> f32 {
    let units: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|code| u32::from(glyph_width(code)))
        .sum();
    units as f32 * font_size / 1000.0
}
