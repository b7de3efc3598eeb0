//! Page geometry and watermark placement.
//!
//! The watermark is centered on the page and rotated counter-clockwise
//! about that center. Everything here works in PDF user space: points,
//! origin at the lower-left corner, y growing upwards.
//!
//! # Example
//!
//! ```
//! use pdfstamp::watermark::position::{PageGeometry, Transform};
//!
//! let page = PageGeometry::new(612.0, 792.0);
//! let transform = Transform::centered_rotation(&page, 90.0);
//! let (x, y) = transform.apply(10.0, 0.0);
//! assert!((x - 306.0).abs() < 1e-3 && (y - 406.0).abs() < 1e-3);
//! ```

/// Coefficients below this magnitude are snapped to zero.
const SNAP_EPSILON: f32 = 1e-6;

/// Tolerance used when comparing page sizes.
pub const SIZE_TOLERANCE: f32 = 0.01;

/// Visible area of a page, taken from its MediaBox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Lower-left x of the MediaBox
    pub x0: f32,
    /// Lower-left y of the MediaBox
    pub y0: f32,
    pub width: f32,
    pub height: f32,
}

impl PageGeometry {
    /// Geometry with its origin at (0, 0).
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            width,
            height,
        }
    }

    /// Build geometry from a `[llx lly urx ury]` rectangle.
    ///
    /// Corners may be given in any order. Returns `None` for empty or
    /// non-finite rectangles.
    pub fn from_rect(rect: [f32; 4]) -> Option<Self> {
        if rect.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let x0 = rect[0].min(rect[2]);
        let y0 = rect[1].min(rect[3]);
        let width = (rect[2] - rect[0]).abs();
        let height = (rect[3] - rect[1]).abs();
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(Self {
            x0,
            y0,
            width,
            height,
        })
    }

    /// Center of the page relative to its own lower-left corner.
    fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn same_size(&self, other: &PageGeometry) -> bool {
        (self.width - other.width).abs() <= SIZE_TOLERANCE
            && (self.height - other.height).abs() <= SIZE_TOLERANCE
    }
}

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Affine transform `[a b c d e f]` as used by the PDF `cm` operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Transform {
    pub fn translation(x: f32, y: f32) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: x,
            f: y,
        }
    }

    /// Rotate counter-clockwise by `degrees` about the page center.
    ///
    /// Angles that differ by a multiple of 360 produce identical matrices.
    pub fn centered_rotation(page: &PageGeometry, degrees: f32) -> Self {
        let radians = normalize_degrees(degrees).to_radians();
        let (sin, cos) = radians.sin_cos();
        let (sin, cos) = (snap(sin), snap(cos));
        let (cx, cy) = page.center();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: cx,
            f: cy,
        }
    }

    /// Map a point through the transform.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    pub fn coefficients(&self) -> [f32; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

fn snap(value: f32) -> f32 {
    if value.abs() < SNAP_EPSILON {
        0.0
    } else {
        value
    }
}

/// Text-space origin that centers a run of `text_width` points on (0, 0).
pub fn centered_text_origin(text_width: f32) -> (f32, f32) {
    (-text_width / 2.0, 0.0)
}
