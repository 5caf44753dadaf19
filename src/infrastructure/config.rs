//! Application configuration
//!
//! Layered with the `config` crate, later layers winning:
//! built-in defaults, an optional TOML file, then environment variables
//! named `SHELF_SCRAPER__<SECTION>__<KEY>`. CLI flags are applied by the
//! binary on top of the loaded value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::http_client::HttpClientConfig;
use super::parsing::ListingSelectors;
use super::scraper_api::ScraperApiEndpoints;
use crate::application::detail_enricher::EnrichmentPolicy;
use crate::application::listing_acquirer::{AcquisitionStrategy, PollPolicy};
use crate::domain::ColumnCase;

/// Default values
pub mod defaults {
    pub const DESTINATION_PATH: &str = "scraped_french_books.csv";
    pub const NUMBER_OF_PAGES: u32 = 20;
    pub const PAGE_WORKERS: usize = 10;
    pub const POLL_INTERVAL_MS: u64 = 1000;
    pub const LOG_FILE: &str = "amazon_scraping.log";
    pub const LOG_LEVEL: &str = "info";
    pub const DELIMITER: char = ',';

    /// Prefix of configuration environment variables
    pub const ENV_PREFIX: &str = "SHELF_SCRAPER";
    /// Environment variable holding the scraping API credential
    pub const API_KEY_ENV: &str = "SCRAPER_API_KEY";
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {message}")]
    Validation { message: String },
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scrape: ScrapeSettings,
    pub polling: PollingSettings,
    pub enrichment: EnrichmentSettings,
    pub output: OutputSettings,
    pub http: HttpClientConfig,
    pub api: ScraperApiEndpoints,
    pub selectors: ListingSelectors,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeSettings {
    /// CSV file written at the end of a successful run
    pub destination_path: PathBuf,
    pub number_of_pages: u32,
    pub strategy: AcquisitionStrategy,
    /// Concurrent page fetches for the direct strategy
    pub page_workers: usize,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            destination_path: PathBuf::from(defaults::DESTINATION_PATH),
            number_of_pages: defaults::NUMBER_OF_PAGES,
            strategy: AcquisitionStrategy::default(),
            page_workers: defaults::PAGE_WORKERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    pub interval_ms: u64,
    /// Unset means poll until the job finishes
    pub max_attempts: Option<u32>,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: defaults::POLL_INTERVAL_MS,
            max_attempts: None,
        }
    }
}

impl PollingSettings {
    pub const fn policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.interval_ms),
            max_attempts: self.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentSettings {
    pub failure_policy: EnrichmentPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub column_case: ColumnCase,
    pub delimiter: char,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            column_case: ColumnCase::default(),
            delimiter: defaults::DELIMITER,
        }
    }
}

impl OutputSettings {
    /// Delimiter as the single byte the CSV writer expects
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| ConfigError::invalid(format!("output.delimiter must be ASCII, got {:?}", self.delimiter)))
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,
    /// Log file, appended to across runs
    pub log_file: PathBuf,
    pub console_output: bool,
    pub file_output: bool,
    /// JSON lines in the log file instead of plain text
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            log_file: PathBuf::from(defaults::LOG_FILE),
            console_output: true,
            file_output: true,
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scrape.number_of_pages == 0 {
            return Err(ConfigError::invalid("scrape.number_of_pages must be greater than 0"));
        }
        if self.scrape.page_workers == 0 {
            return Err(ConfigError::invalid("scrape.page_workers must be greater than 0"));
        }
        if self.polling.interval_ms == 0 {
            return Err(ConfigError::invalid("polling.interval_ms must be greater than 0"));
        }
        if self.polling.max_attempts == Some(0) {
            return Err(ConfigError::invalid("polling.max_attempts must be greater than 0 when set"));
        }
        if self.logging.file_output && self.logging.log_file.as_os_str().is_empty() {
            return Err(ConfigError::invalid("logging.log_file must not be empty"));
        }
        if self.scrape.destination_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("scrape.destination_path must not be empty"));
        }
        for (name, endpoint) in [
            ("api.api_base_url", &self.api.api_base_url),
            ("api.batch_url", &self.api.batch_url),
            ("api.structured_url", &self.api.structured_url),
            ("api.listing_url", &self.api.listing_url),
        ] {
            url::Url::parse(endpoint).map_err(|e| ConfigError::invalid(format!("{name} is not a valid URL: {e}")))?;
        }
        self.output.delimiter_byte()?;
        Ok(())
    }
}
