//! PDF text watermarking.
//!
//! Stamps a single line of text, rotated about the page center, onto every
//! page of an existing PDF while keeping page count, order and geometry.
//!
//! # Features
//!
//! - Named or numeric RGB colors
//! - Any rotation angle (normalized into `[0, 360)`)
//! - Watermark below (default) or above the page content
//! - Atomic file output with page-count verification, or streaming output
//!
//! # Pipeline
//!
//! For each page in source order:
//!
//! 1. Read the page geometry (inherited MediaBox honored)
//! 2. [`overlay::generate_overlay`] builds a one-page PDF with only the text
//! 3. [`compositor::composite`] merges it into the page as a Form XObject
//!
//! The assembled document is then written by [`processor::WatermarkProcessor`].

pub mod color;
pub mod compositor;
pub mod config;
pub mod document;
pub mod error;
pub mod font;
pub mod output;
pub mod overlay;
pub mod position;
pub mod processor;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use color::{resolve_color, Rgb, NAMED_COLORS};
pub use compositor::{composite, Placement};
pub use config::{WatermarkSpec, WatermarkSpecBuilder};
pub use document::{OutputDocument, SourceDocument};
pub use error::WatermarkError;
pub use output::StagedFile;
pub use overlay::{generate_overlay, OverlayDocument};
pub use position::PageGeometry;
pub use processor::{PipelineState, WatermarkProcessor, WatermarkReport};
