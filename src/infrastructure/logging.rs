//! Logging system configuration and initialization
//!
//! Sets up `tracing` with:
//! - a console layer on stdout
//! - a non-blocking file layer appending to the configured log file
//! - local-time timestamps
//! - dependency noise capped at `warn` unless `trace` is requested
//!
//! `RUST_LOG` overrides the configured level entirely.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::fmt::{self, time::FormatTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub use super::config::LoggingConfig;

/// Targets that are too chatty below `trace`
const QUIET_TARGETS: &[&str] = &["reqwest", "hyper", "hyper_util", "h2", "rustls"];

/// Local time, millisecond precision
struct LocalTimeFormatter;

impl FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Keeps the file writer alive. Dropping it flushes pending log lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Build the filter from `RUST_LOG`, or from the configured level
fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level: {}", config.level))?;

    if !config.level.to_lowercase().contains("trace") {
        for target in QUIET_TARGETS {
            filter = filter.add_directive(format!("{target}=warn").parse()?);
        }
    }

    Ok(filter)
}

/// Split a log file path into the directory and file name `rolling::never` wants
fn split_log_path(path: &Path) -> Result<(&Path, &std::ffi::OsStr)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((directory, file_name))
}

/// Initialize logging with the given configuration.
///
/// Hold the returned guard until the process exits.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = build_filter(config)?;

    let (file_layer, file_guard) = if config.file_output {
        let (directory, file_name) = split_log_path(&config.log_file)?;
        std::fs::create_dir_all(directory)
            .with_context(|| format!("Failed to create log directory {}", directory.display()))?;

        let (writer, guard) = non_blocking(rolling::never(directory, file_name));
        let layer = if config.json_format {
            fmt::Layer::new()
                .json()
                .with_writer(writer)
                .with_timer(LocalTimeFormatter)
                .with_target(true)
                .with_ansi(false)
                .boxed()
        } else {
            fmt::Layer::new()
                .with_writer(writer)
                .with_timer(LocalTimeFormatter)
                .with_target(false)
                .with_ansi(false)
                .boxed()
        };
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let console_layer = config.console_output.then(|| {
        fmt::Layer::new()
            .with_writer(std::io::stdout)
            .with_timer(LocalTimeFormatter)
            .with_target(false)
    });

    Registry::default()
        .with(file_layer)
        .with(console_layer)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(
        "Logging initialized (level: {}, file: {})",
        config.level,
        config.log_file.display()
    );

    Ok(LoggingGuard { _file: file_guard })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn bare_file_name_logs_to_current_directory() {
        let path = PathBuf::from("amazon_scraping.log");
        let (directory, file_name) = split_log_path(&path).unwrap();
        assert_eq!(directory, Path::new("."));
        assert_eq!(file_name, "amazon_scraping.log");
    }

    #[test]
    fn nested_log_path_is_split() {
        let path = PathBuf::from("logs/run/scrape.log");
        let (directory, file_name) = split_log_path(&path).unwrap();
        assert_eq!(directory, Path::new("logs/run"));
        assert_eq!(file_name, "scrape.log");
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        assert!(split_log_path(Path::new("/")).is_err());
    }

    #[test]
    fn invalid_level_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            level: "shelf_scraper=notalevel".to_string(),
            ..LoggingConfig::default()
        };
        assert!(build_filter(&config).is_err());
    }

    #[test]
    fn default_level_builds_filter() {
        assert!(build_filter(&LoggingConfig::default()).is_ok());
    }
}
