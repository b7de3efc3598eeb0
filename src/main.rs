use clap::Parser;
use pdfstamp::config::{Config, Overrides};
use pdfstamp::logging::{init_subscriber, LogSettings, TracingReporter};
use pdfstamp::watermark::{Placement, WatermarkProcessor};
use std::path::PathBuf;
use std::process::ExitCode;

const COLOR_HELP: &str = "\
Colors:
  Named: red, green, blue, yellow, cyan, magenta, black, white,
         gray/grey, lightgray/lightgrey, darkgray/darkgrey
  RGB:   three values between 0.0 and 1.0, e.g. -c \"0.5 0.5 0.5\" or -c 0.5,0.5,0.5

Examples:
  pdfstamp input.pdf -o output.pdf -t DRAFT
  pdfstamp input.pdf -t CONFIDENTIAL -c blue -r 30 > output.pdf";

/// pdfstamp - Stamp a rotated text watermark onto every page of a PDF
#[derive(Parser, Debug)]
#[command(name = "pdfstamp")]
#[command(version, about, long_about = None, after_help = COLOR_HELP)]
struct Args {
    /// Input PDF file
    input: PathBuf,

    /// Output PDF file (default: write to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Watermark text [default: WATERMARK]
    #[arg(short, long)]
    text: Option<String>,

    /// Font size in points [default: 100]
    #[arg(short = 's', long = "size")]
    size: Option<f32>,

    /// Rotation angle in degrees, counter-clockwise [default: 45]
    #[arg(short, long, allow_negative_numbers = true)]
    rotation: Option<f32>,

    /// Color name or three RGB values [default: red]
    #[arg(short, long, value_name = "COLOR")]
    color: Option<String>,

    /// Draw the watermark over the page content instead of beneath it
    #[arg(long)]
    over: bool,

    /// YAML file with watermark settings (command-line flags take precedence)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report warnings and errors on the console
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    };

    // Initialize logging subsystem; failure only costs the log file
    let settings = LogSettings {
        verbose: args.verbose,
        quiet: args.quiet,
        log_dir: config.as_ref().ok().and_then(|c| c.log_dir.clone()),
        console_only: false,
    };
    match init_subscriber(&settings) {
        Ok(Some(path)) => tracing::debug!(log_file = %path.display(), "File logging enabled"),
        Ok(None) => tracing::debug!("No writable log directory, logging to console only"),
        Err(e) => eprintln!("Warning: failed to initialize logging: {}", e),
    }

    let config = match config {
        Ok(config) => config.with_overrides(Overrides {
            text: args.text.clone(),
            font_size: args.size,
            rotation: args.rotation,
            color: args.color.clone(),
            placement: args.over.then_some(Placement::Above),
        }),
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let spec = match config.watermark_spec() {
        Ok(spec) => spec,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!(
        input = %args.input.display(),
        output = ?args.output,
        placement = config.placement.as_str(),
        "Configuration loaded"
    );

    let reporter = TracingReporter;
    let mut processor = WatermarkProcessor::new(spec, &reporter).with_placement(config.placement);
    match processor.apply(&args.input, args.output.as_deref()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
