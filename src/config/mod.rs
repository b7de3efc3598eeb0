// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::watermark::color::resolve_color;
use crate::watermark::config::{DEFAULT_FONT_SIZE, DEFAULT_ROTATION, DEFAULT_TEXT};
use crate::watermark::{Placement, WatermarkError, WatermarkSpec};

fn default_text() -> String {
    DEFAULT_TEXT.to_string()
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_rotation() -> f32 {
    DEFAULT_ROTATION
}

fn default_color() -> String {
    "red".to_string()
}

/// Watermark settings loaded from a YAML file.
///
/// ```yaml
/// text: "CONFIDENTIAL ${DEPARTMENT}"
/// font_size: 72
/// rotation: 30
/// color: "0.5, 0.5, 0.5"
/// placement: above
/// log_dir: /var/log/stamping
/// ```
///
/// Every key is optional; command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_rotation")]
    pub rotation: f32,
    /// Color name or three components, e.g. "gray" or "0.5,0.5,0.5"
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            text: default_text(),
            font_size: default_font_size(),
            rotation: default_rotation(),
            color: default_color(),
            placement: Placement::default(),
            log_dir: None,
        }
    }
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub text: Option<String>,
    pub font_size: Option<f32>,
    pub rotation: Option<f32>,
    pub color: Option<String>,
    pub placement: Option<Placement>,
}

impl Config {
    /// Parse YAML, replacing `${VAR_NAME}` with environment variables.
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, WatermarkError> {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| WatermarkError::Config(e.to_string()))?;

        // Check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                WatermarkError::Config(format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                ))
            })?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        // An empty document means "all defaults"
        if substituted.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&substituted).map_err(|e| WatermarkError::Config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WatermarkError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            WatermarkError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_with_env(&yaml)
    }

    /// Apply command-line values on top of this configuration.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(text) = overrides.text {
            self.text = text;
        }
        if let Some(font_size) = overrides.font_size {
            self.font_size = font_size;
        }
        if let Some(rotation) = overrides.rotation {
            self.rotation = rotation;
        }
        if let Some(color) = overrides.color {
            self.color = color;
        }
        if let Some(placement) = overrides.placement {
            self.placement = placement;
        }
        self
    }

    /// Resolve the color and validate everything into a [`WatermarkSpec`].
    pub fn watermark_spec(&self) -> Result<WatermarkSpec, WatermarkError> {
        let color = resolve_color(&self.color)?;
        WatermarkSpec::new(self.text.clone(), self.font_size, color, self.rotation)
    }
}
