//! Watermark error types.
//!
//! Every failure the watermark engine can report. Components never recover
//! internally; the pipeline logs and returns these to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while watermarking a document.
#[derive(Error, Debug)]
pub enum WatermarkError {
    /// Input missing, unreadable, or not a usable PDF
    #[error("Failed to open source PDF {}: {message}", .path.display())]
    SourceOpen { path: PathBuf, message: String },

    /// Color token is neither a known name nor three numbers
    #[error("Invalid color '{token}': {reason}. Use a named color (red, blue, ...) or three RGB values between 0.0 and 1.0")]
    InvalidColorFormat { token: String, reason: String },

    /// Color component outside [0.0, 1.0]
    #[error("Invalid color '{token}': component {value} out of range [0.0, 1.0]")]
    InvalidColorRange { token: String, value: f32 },

    /// Watermark parameters rejected before any page is touched
    #[error("Invalid watermark settings: {0}")]
    InvalidSpec(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Building the overlay for a page failed
    #[error("Failed to render watermark overlay{}: {message}", page_suffix(.page))]
    OverlayRender { page: Option<usize>, message: String },

    /// Merging the overlay into a page failed
    #[error("Failed to composite watermark{}: {message}", page_suffix(.page))]
    Composite { page: Option<usize>, message: String },

    /// Temporary output could not be written or published
    #[error("Failed to write output {}: {message}", .path.display())]
    OutputWrite { path: PathBuf, message: String },

    /// Published file has a different page count than the source
    #[error("PDF verification failed for {}: expected {expected} pages, got {actual}", .path.display())]
    VerificationMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    /// Published file could not be re-read for verification
    #[error("PDF verification failed for {}: {message}", .path.display())]
    VerificationError { path: PathBuf, message: String },
}

fn page_suffix(page: &Option<usize>) -> String {
    match page {
        Some(page) => format!(" on page {}", page),
        None => String::new(),
    }
}

impl WatermarkError {
    pub(crate) fn overlay(message: impl Into<String>) -> Self {
        Self::OverlayRender {
            page: None,
            message: message.into(),
        }
    }

    pub(crate) fn composite(message: impl Into<String>) -> Self {
        Self::Composite {
            page: None,
            message: message.into(),
        }
    }

    /// Attach a 1-based page number to per-page errors.
    pub fn at_page(self, page_number: usize) -> Self {
        match self {
            Self::OverlayRender { message, .. } => Self::OverlayRender {
                page: Some(page_number),
                message,
            },
            Self::Composite { message, .. } => Self::Composite {
                page: Some(page_number),
                message,
            },
            other => other,
        }
    }

    /// True for failures detected after the output was already published.
    pub fn is_post_publish(&self) -> bool {
        matches!(
            self,
            Self::VerificationMismatch { .. } | Self::VerificationError { .. }
        )
    }
}
