//! Tracing setup for tinyredis
//!
//! Provides unified logging configuration for the server and client. Logs go
//! to the console (colored, local timestamps) and, when a log file is
//! configured, are appended to that file as well.
//!
//! # Usage
//!
//! For CLI applications:
//! ```ignore
//! use tinyredis_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::default()).expect("failed to initialize tracing");
//! ```
//!
//! For the server, mirroring everything into `log.txt`:
//! ```ignore
//! use tinyredis_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::server().with_log_file("log.txt"))
//!     .expect("failed to initialize tracing");
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{Level, Subscriber};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan, time::ChronoLocal},
    prelude::*,
};

/// Timestamp layout used by every sink.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),

    /// Log file path has no file name component
    #[error("invalid log file path: {}", .0.display())]
    LogFilePath(PathBuf),

    /// Failed to open the log file for appending
    #[error("failed to open log file: {0}")]
    LogFile(#[from] InitError),
}

/// Output format for console logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Human-readable multi-line format
    Pretty,
    /// Compact single-line format (default)
    #[default]
    Compact,
    /// JSON format
    Json,
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// The default log level when RUST_LOG is not set
    pub default_level: Level,
    /// Output format for console messages
    pub output_format: TracingOutputFormat,
    /// Whether to color console output by level
    pub ansi: bool,
    /// Whether to include file/line information in logs
    pub include_location: bool,
    /// Whether to include target (module path) in logs
    pub include_target: bool,
    /// Whether to include timestamps
    pub include_timestamp: bool,
    /// Whether to include span events (enter/exit)
    pub include_span_events: bool,
    /// Custom env filter directive (overrides default_level and RUST_LOG if set)
    pub env_filter: Option<String>,
    /// File that receives a plain-text copy of every log line
    pub log_file: Option<PathBuf>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Compact,
            ansi: true,
            include_location: false,
            include_target: true,
            include_timestamp: true,
            include_span_events: false,
            env_filter: None,
            log_file: None,
        }
    }
}

impl TracingConfig {
    /// Create a config suitable for CLI usage with debug mode
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            include_timestamp: false,
            ..Self::default()
        }
    }

    /// Create a config suitable for the long-running server
    #[must_use]
    pub fn server() -> Self {
        Self {
            include_span_events: true,
            ..Self::default()
        }
    }

    /// Set the default log level
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set a custom env filter directive
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Also append logs to the given file
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    fn span_events(&self) -> FmtSpan {
        if self.include_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Initialize tracing with the given configuration.
///
/// This should be called once at the start of the application.
/// The `RUST_LOG` environment variable can be used to override the default
/// level. An explicit `env_filter` takes precedence over `RUST_LOG`.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set, if the
/// env filter directive is invalid, or if the log file cannot be opened.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let subscriber = build_subscriber(&config)?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Builds the subscriber described by `config` without installing it.
pub fn build_subscriber(
    config: &TracingConfig,
) -> Result<impl Subscriber + Send + Sync + 'static, TracingError> {
    let env_filter = if let Some(ref filter) = config.env_filter {
        EnvFilter::try_new(filter)?
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("tinyredis={}", config.default_level)))
    };

    let mut layers = vec![console_layer(config)];
    if let Some(ref path) = config.log_file {
        layers.push(file_layer(config, path)?);
    }

    Ok(tracing_subscriber::registry().with(layers).with(env_filter))
}

fn local_timer() -> ChronoLocal {
    ChronoLocal::new(TIMESTAMP_FORMAT.to_string())
}

fn console_layer(config: &TracingConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = fmt::layer()
        .with_ansi(config.ansi)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_target(config.include_target)
        .with_span_events(config.span_events());

    match (config.output_format, config.include_timestamp) {
        (TracingOutputFormat::Pretty, true) => layer.pretty().with_timer(local_timer()).boxed(),
        (TracingOutputFormat::Pretty, false) => layer.pretty().without_time().boxed(),
        (TracingOutputFormat::Compact, true) => layer.compact().with_timer(local_timer()).boxed(),
        (TracingOutputFormat::Compact, false) => layer.compact().without_time().boxed(),
        (TracingOutputFormat::Json, true) => layer.json().with_timer(local_timer()).boxed(),
        (TracingOutputFormat::Json, false) => layer.json().without_time().boxed(),
    }
}

/// Plain-text sink appending to `path`. Never rotated.
fn file_layer(
    config: &TracingConfig,
    path: &Path,
) -> Result<Box<dyn Layer<Registry> + Send + Sync>, TracingError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| TracingError::LogFilePath(path.to_path_buf()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)?;

    Ok(fmt::layer()
        .with_writer(appender)
        .with_ansi(false)
        .with_target(config.include_target)
        .with_timer(local_timer())
        .boxed())
}
