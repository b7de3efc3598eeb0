//! Document pipeline.
//!
//! Drives a single run: open the source, stamp every page in order, write
//! the result and verify it.
//!
//! ```text
//! Idle -> Opening -> Processing(0..n) -> Writing -> Verifying -> Done
//!            \_____________\_______________\___________\______-> Failed
//! ```
//!
//! Any error aborts the run; nothing is written unless every page was
//! stamped. File output is published atomically (see [`super::output`]).
//!
//! # Example
//!
//! ```no_run
//! use pdfstamp::logging::TracingReporter;
//! use pdfstamp::watermark::{WatermarkProcessor, WatermarkSpec};
//! use std::path::Path;
//!
//! let spec = WatermarkSpec::builder().text("DRAFT").build()?;
//! let reporter = TracingReporter;
//! let mut processor = WatermarkProcessor::new(spec, &reporter);
//! let report = processor.apply_to_file(Path::new("in.pdf"), Path::new("out.pdf"))?;
//! println!("stamped {} pages", report.pages);
//! # Ok::<(), pdfstamp::watermark::WatermarkError>(())
//! ```

use super::compositor::{composite, Placement};
use super::config::WatermarkSpec;
use super::document::{page_geometry, OutputDocument, SourceDocument};
use super::output::StagedFile;
use super::overlay::generate_overlay;
use super::WatermarkError;
use crate::logging::{LogLevel, ProgressReporter};
use lopdf::Document;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// `source` attached to every progress event.
const LOG_SOURCE: &str = "watermark";

/// An INFO progress line is emitted every this many pages.
pub const PROGRESS_INTERVAL: usize = 10;

/// Placeholder path used in errors when writing to a stream.
const STREAM_PATH: &str = "<stream>";

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Opening,
    /// Zero-based index of the page being stamped
    Processing(usize),
    Writing,
    Verifying,
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Opening => f.write_str("opening"),
            Self::Processing(index) => write!(f, "processing page {}", index + 1),
            Self::Writing => f.write_str("writing"),
            Self::Verifying => f.write_str("verifying"),
            Self::Done => f.write_str("done"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkReport {
    pub pages: usize,
    pub input_bytes: u64,
    pub output_bytes: u64,
}

/// Applies one [`WatermarkSpec`] to whole documents.
pub struct WatermarkProcessor<'r> {
    spec: WatermarkSpec,
    placement: Placement,
    reporter: &'r dyn ProgressReporter,
    state: PipelineState,
}

impl<'r> WatermarkProcessor<'r> {
    pub fn new(spec: WatermarkSpec, reporter: &'r dyn ProgressReporter) -> Self {
        Self {
            spec,
            placement: Placement::default(),
            reporter,
            state: PipelineState::Idle,
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn spec(&self) -> &WatermarkSpec {
        &self.spec
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Stamp `input` and publish the result to `output`, or to stdout when
    /// no output path is given.
    pub fn apply(
        &mut self,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<WatermarkReport, WatermarkError> {
        match output {
            Some(path) => self.apply_to_file(input, path),
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                self.apply_to_writer(input, &mut handle)
            }
        }
    }

    /// Stamp `input` and atomically replace `output`, then verify it.
    pub fn apply_to_file(
        &mut self,
        input: &Path,
        output: &Path,
    ) -> Result<WatermarkReport, WatermarkError> {
        let result = self.run_to_file(input, output);
        self.finish(result)
    }

    /// Stamp `input` and serialize the result into `writer`.
    ///
    /// No atomicity and no verification in this mode.
    pub fn apply_to_writer<W: Write>(
        &mut self,
        input: &Path,
        writer: &mut W,
    ) -> Result<WatermarkReport, WatermarkError> {
        let result = self.run_to_writer(input, writer);
        self.finish(result)
    }

    fn run_to_file(
        &mut self,
        input: &Path,
        output: &Path,
    ) -> Result<WatermarkReport, WatermarkError> {
        let source = self.open(input)?;
        let mut document = self.stamp_pages(&source)?;

        self.transition(PipelineState::Writing);
        self.report(
            LogLevel::Info,
            &format!("Writing watermarked PDF to: {}", output.display()),
        );
        let output_bytes = write_atomic(&mut document, output)?;
        let report = WatermarkReport {
            pages: source.page_count(),
            input_bytes: source.byte_len(),
            output_bytes,
        };
        self.report_sizes(&report);

        self.transition(PipelineState::Verifying);
        self.verify(output, source.page_count())?;
        Ok(report)
    }

    fn run_to_writer<W: Write>(
        &mut self,
        input: &Path,
        writer: &mut W,
    ) -> Result<WatermarkReport, WatermarkError> {
        let source = self.open(input)?;
        let mut document = self.stamp_pages(&source)?;

        self.transition(PipelineState::Writing);
        self.report(LogLevel::Info, "Writing watermarked PDF to output stream");
        let stream_error = |e: &dyn fmt::Display| WatermarkError::OutputWrite {
            path: PathBuf::from(STREAM_PATH),
            message: e.to_string(),
        };

        // serialize fully first so a failure never leaves a partial document
        let mut buffer = Vec::new();
        document
            .save_to(&mut buffer)
            .map_err(|e| stream_error(&e))?;
        writer.write_all(&buffer).map_err(|e| stream_error(&e))?;
        writer.flush().map_err(|e| stream_error(&e))?;

        let report = WatermarkReport {
            pages: source.page_count(),
            input_bytes: source.byte_len(),
            output_bytes: buffer.len() as u64,
        };
        self.report_sizes(&report);
        Ok(report)
    }

    fn open(&mut self, input: &Path) -> Result<SourceDocument, WatermarkError> {
        self.transition(PipelineState::Opening);
        let source = SourceDocument::open(input)?;
        self.report(
            LogLevel::Info,
            &format!(
                "Reading PDF file: {} (size: {} bytes)",
                input.display(),
                source.byte_len()
            ),
        );
        Ok(source)
    }

    /// Stamp every page in source order and assemble the output document.
    fn stamp_pages(&mut self, source: &SourceDocument) -> Result<Document, WatermarkError> {
        let total = source.page_count();
        self.report(LogLevel::Info, &format!("PDF has {} page(s)", total));
        self.report(
            LogLevel::Info,
            &format!(
                "Creating watermark: '{}' (font: {}pt, rotation: {}°)",
                self.spec.text(),
                self.spec.font_size(),
                self.spec.rotation_degrees()
            ),
        );

        let mut output = OutputDocument::from_source(source);
        for (index, &page_id) in source.page_ids().iter().enumerate() {
            self.transition(PipelineState::Processing(index));
            let page_number = index + 1;

            let geometry = page_geometry(source.document(), page_id).map_err(|message| {
                WatermarkError::OverlayRender {
                    page: Some(page_number),
                    message,
                }
            })?;
            self.report(
                LogLevel::Debug,
                &format!(
                    "Page {}: size {} x {}",
                    page_number, geometry.width, geometry.height
                ),
            );

            let overlay =
                generate_overlay(&geometry, &self.spec).map_err(|e| e.at_page(page_number))?;
            composite(output.document_mut(), page_id, &overlay, self.placement)
                .map_err(|e| e.at_page(page_number))?;
            output.push_page(page_id);

            if page_number % PROGRESS_INTERVAL == 0 || page_number == total {
                self.report(
                    LogLevel::Info,
                    &format!("Processed {}/{} page(s)", page_number, total),
                );
            }
        }

        output.finalize()
    }

    /// Re-read the published file and compare page counts.
    fn verify(&mut self, output: &Path, expected: usize) -> Result<(), WatermarkError> {
        let published = Document::load(output).map_err(|e| WatermarkError::VerificationError {
            path: output.to_path_buf(),
            message: e.to_string(),
        })?;

        let actual = published.get_pages().len();
        if actual != expected {
            return Err(WatermarkError::VerificationMismatch {
                path: output.to_path_buf(),
                expected,
                actual,
            });
        }
        self.report(LogLevel::Info, &format!("PDF verified: {} page(s)", actual));
        Ok(())
    }

    fn finish(
        &mut self,
        result: Result<WatermarkReport, WatermarkError>,
    ) -> Result<WatermarkReport, WatermarkError> {
        match &result {
            Ok(_) => {
                self.transition(PipelineState::Done);
                self.report(LogLevel::Info, "Watermark completed successfully");
            }
            Err(err) => {
                self.transition(PipelineState::Failed);
                let level = if err.is_post_publish() {
                    LogLevel::Warning
                } else {
                    LogLevel::Error
                };
                self.report(level, &format!("Failed to watermark PDF: {}", err));
            }
        }
        result
    }

    fn report_sizes(&self, report: &WatermarkReport) {
        self.report(
            LogLevel::Debug,
            &format!(
                "Input size: {} bytes, Output size: {} bytes",
                report.input_bytes, report.output_bytes
            ),
        );
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!(from = %self.state, to = %next, "Pipeline state change");
        self.state = next;
    }

    fn report(&self, level: LogLevel, message: &str) {
        self.reporter.emit(level, message, LOG_SOURCE);
    }
}

/// Serialize through a staged temporary and rename it over `output`.
fn write_atomic(document: &mut Document, output: &Path) -> Result<u64, WatermarkError> {
    let write_error = |e: &dyn fmt::Display| WatermarkError::OutputWrite {
        path: output.to_path_buf(),
        message: e.to_string(),
    };

    let mut staged = StagedFile::create(output).map_err(|e| write_error(&e))?;
    document
        .save_to(&mut staged)
        .map_err(|e| write_error(&e))?;
    staged.commit().map_err(|e| write_error(&e))
}
