//! Watermark appearance settings.
//!
//! A [`WatermarkSpec`] is validated once when built and is immutable
//! afterwards, so the rest of the engine never re-checks it.

use super::color::Rgb;
use super::WatermarkError;

pub const DEFAULT_TEXT: &str = "WATERMARK";
pub const DEFAULT_FONT_SIZE: f32 = 100.0;
pub const DEFAULT_ROTATION: f32 = 45.0;
pub const DEFAULT_COLOR: Rgb = Rgb::RED;

/// What to draw on each page and how.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSpec {
    text: String,
    font_size: f32,
    color: Rgb,
    rotation_degrees: f32,
}

impl WatermarkSpec {
    /// Create a validated spec.
    ///
    /// # Errors
    ///
    /// Returns [`WatermarkError::InvalidSpec`] if the text is empty, the font
    /// size is not a positive finite number, the rotation is not finite, or
    /// a color component is outside `[0.0, 1.0]`.
    pub fn new(
        text: impl Into<String>,
        font_size: f32,
        color: Rgb,
        rotation_degrees: f32,
    ) -> Result<Self, WatermarkError> {
        let spec = Self {
            text: text.into(),
            font_size,
            color,
            rotation_degrees,
        };
        spec.validate().map_err(WatermarkError::InvalidSpec)?;
        Ok(spec)
    }

    pub fn builder() -> WatermarkSpecBuilder {
        WatermarkSpecBuilder::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn rotation_degrees(&self) -> f32 {
        self.rotation_degrees
    }

    fn validate(&self) -> Result<(), String> {
        if self.text.is_empty() {
            return Err("watermark text cannot be empty".to_string());
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(format!(
                "font size must be a positive number, got {}",
                self.font_size
            ));
        }
        if !self.rotation_degrees.is_finite() {
            return Err(format!(
                "rotation must be a finite number of degrees, got {}",
                self.rotation_degrees
            ));
        }
        if let Some(bad) = self
            .color
            .components()
            .iter()
            .find(|v| !(0.0..=1.0).contains(*v))
        {
            return Err(format!("color component {} out of range [0.0, 1.0]", bad));
        }
        Ok(())
    }
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            color: DEFAULT_COLOR,
            rotation_degrees: DEFAULT_ROTATION,
        }
    }
}

/// Builder for [`WatermarkSpec`]; unset fields take the defaults.
#[derive(Debug, Clone, Default)]
pub struct WatermarkSpecBuilder {
    text: Option<String>,
    font_size: Option<f32>,
    color: Option<Rgb>,
    rotation_degrees: Option<f32>,
}

impl WatermarkSpecBuilder {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn font_size(mut self, font_size: f32) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    pub fn rotation(mut self, degrees: f32) -> Self {
        self.rotation_degrees = Some(degrees);
        self
    }

    pub fn build(self) -> Result<WatermarkSpec, WatermarkError> {
        WatermarkSpec::new(
            self.text.unwrap_or_else(|| DEFAULT_TEXT.to_string()),
            self.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            self.color.unwrap_or(DEFAULT_COLOR),
            self.rotation_degrees.unwrap_or(DEFAULT_ROTATION),
        )
    }
}
