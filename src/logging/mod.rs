// Logging module for structured logging using the tracing crate

use chrono::Local;
use std::error::Error;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable naming an explicit log directory.
pub const LOG_DIR_ENV: &str = "PDFSTAMP_LOG_DIR";

/// Name of the log file inside the chosen directory.
pub const LOG_FILE_NAME: &str = "pdfstamp.log";

const APP_DIR: &str = "pdfstamp";

/// Severity of a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Sink for progress and diagnostic events emitted by the pipeline.
pub trait ProgressReporter {
    fn emit(&self, level: LogLevel, message: &str, source: &str);
}

/// Forwards events to the global `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn emit(&self, level: LogLevel, message: &str, source: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(source, "{}", message),
            LogLevel::Info => tracing::info!(source, "{}", message),
            LogLevel::Warning => tracing::warn!(source, "{}", message),
            LogLevel::Error => tracing::error!(source, "{}", message),
        }
    }
}

/// A recorded progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    pub source: String,
}

/// Keeps every event in memory, for embedding and inspection.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Messages at `level`, in emission order.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level)
            .map(|event| event.message)
            .collect()
    }
}

impl ProgressReporter for MemoryReporter {
    fn emit(&self, level: LogLevel, message: &str, source: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(LogEvent {
                level,
                message: message.to_string(),
                source: source.to_string(),
            });
        }
    }
}

/// Console and file logging options.
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    /// Enable DEBUG output
    pub verbose: bool,
    /// Only WARNING and above on the console
    pub quiet: bool,
    /// Directory tried before all others
    pub log_dir: Option<PathBuf>,
    /// Skip the log file entirely
    pub console_only: bool,
}

/// `[YYYY-MM-DD HH:MM:SS]` in local time.
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "[{}]", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Candidate log directories, most preferred first.
///
/// Order: explicit override, `$PDFSTAMP_LOG_DIR`, the per-user state
/// directory, the system log directory, the temp directory, `./log`.
pub fn log_dir_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = explicit {
        candidates.push(dir.to_path_buf());
    }
    if let Some(dir) = std::env::var_os(LOG_DIR_ENV).filter(|v| !v.is_empty()) {
        candidates.push(PathBuf::from(dir));
    }
    if let Some(base) = directories::BaseDirs::new() {
        candidates.push(base.home_dir().join(".local").join("log").join(APP_DIR));
    }
    if cfg!(target_os = "macos") {
        candidates.push(PathBuf::from("/private/var/log").join(APP_DIR));
    } else {
        candidates.push(PathBuf::from("/var/log").join(APP_DIR));
    }
    candidates.push(std::env::temp_dir().join(APP_DIR));
    candidates.push(PathBuf::from("log"));
    candidates
}

/// Open the log file in the first writable candidate directory.
pub fn open_log_file(candidates: &[PathBuf]) -> Option<(PathBuf, File)> {
    candidates.iter().find_map(|dir| {
        fs::create_dir_all(dir).ok()?;
        let path = dir.join(LOG_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()?;
        Some((path, file))
    })
}

/// Initialize the tracing subscriber.
///
/// Events go to stderr and, when a writable directory is found, are
/// appended to `pdfstamp.log`. `RUST_LOG` overrides the default level.
///
/// Returns the log file path when file logging is active.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
///
/// # Examples
///
/// ```
/// use pdfstamp::logging::{init_subscriber, LogSettings};
///
/// let settings = LogSettings { console_only: true, ..Default::default() };
/// init_subscriber(&settings).expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(settings: &LogSettings) -> Result<Option<PathBuf>, Box<dyn Error>> {
    let default_level = if settings.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_level = if settings.quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::TRACE
    };
    let console = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_timer(LocalTime)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(console_level);

    let log_file = if settings.console_only {
        None
    } else {
        open_log_file(&log_dir_candidates(settings.log_dir.as_deref()))
    };
    let (log_path, file_layer) = match log_file {
        Some((path, file)) => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_timer(LocalTime)
                .with_target(false)
                .with_ansi(false);
            (Some(path), Some(layer))
        }
        None => (None, None),
    };

    Registry::default()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()?;

    Ok(log_path)
}
