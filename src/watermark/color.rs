//! Watermark color resolution.
//!
//! Converts a user-supplied color token into an RGB triple with each
//! component in `[0.0, 1.0]`. A token is either a named color (case and
//! surrounding whitespace ignored) or three numbers separated by commas or
//! whitespace.
//!
//! # Example
//!
//! ```
//! use pdfstamp::watermark::color::{resolve_color, Rgb};
//!
//! assert_eq!(resolve_color("Red").unwrap(), Rgb::new(1.0, 0.0, 0.0));
//! assert_eq!(resolve_color("0.5 0.5 0.5").unwrap(), resolve_color("gray").unwrap());
//! ```

use super::WatermarkError;
use std::fmt;
use std::str::FromStr;

/// An RGB color in the PDF device color space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn components(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::RED
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve_color(s)
    }
}

/// Named colors accepted on the command line and in config files.
pub const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("red", Rgb::new(1.0, 0.0, 0.0)),
    ("green", Rgb::new(0.0, 1.0, 0.0)),
    ("blue", Rgb::new(0.0, 0.0, 1.0)),
    ("yellow", Rgb::new(1.0, 1.0, 0.0)),
    ("cyan", Rgb::new(0.0, 1.0, 1.0)),
    ("magenta", Rgb::new(1.0, 0.0, 1.0)),
    ("black", Rgb::new(0.0, 0.0, 0.0)),
    ("white", Rgb::new(1.0, 1.0, 1.0)),
    ("gray", Rgb::new(0.5, 0.5, 0.5)),
    ("grey", Rgb::new(0.5, 0.5, 0.5)),
    ("lightgray", Rgb::new(0.8, 0.8, 0.8)),
    ("lightgrey", Rgb::new(0.8, 0.8, 0.8)),
    ("darkgray", Rgb::new(0.3, 0.3, 0.3)),
    ("darkgrey", Rgb::new(0.3, 0.3, 0.3)),
];

/// Look up a named color. Case-insensitive, surrounding whitespace ignored.
pub fn named_color(name: &str) -> Option<Rgb> {
    let name = name.trim().to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, rgb)| *rgb)
}

/// Resolve a color token into an RGB triple.
///
/// Named colors are tried first. Otherwise the token is split on commas if
/// it contains one, or on whitespace if not, and must yield exactly three
/// numbers in `[0.0, 1.0]`.
///
/// # Errors
///
/// * [`WatermarkError::InvalidColorFormat`] when the token is not a name and
///   does not split into exactly three numbers.
/// * [`WatermarkError::InvalidColorRange`] when a number is outside the unit
///   interval.
pub fn resolve_color(token: &str) -> Result<Rgb, WatermarkError> {
    if let Some(rgb) = named_color(token) {
        return Ok(rgb);
    }

    let trimmed = token.trim();
    let parts: Vec<&str> = if trimmed.contains(',') {
        trimmed.split(',').map(str::trim).collect()
    } else {
        trimmed.split_whitespace().collect()
    };

    if parts.len() != 3 {
        return Err(WatermarkError::InvalidColorFormat {
            token: token.to_string(),
            reason: format!("expected 3 components, got {}", parts.len()),
        });
    }

    let mut values = [0.0f32; 3];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse::<f32>()
            .map_err(|_| WatermarkError::InvalidColorFormat {
                token: token.to_string(),
                reason: format!("'{}' is not a number", part),
            })?;
    }

    if let Some(bad) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
        return Err(WatermarkError::InvalidColorRange {
            token: token.to_string(),
            value: *bad,
        });
    }

    Ok(Rgb::new(values[0], values[1], values[2]))
}
