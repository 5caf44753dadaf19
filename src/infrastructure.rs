//! Infrastructure layer: configuration, logging, HTTP and HTML parsing,
//! and the scraping API client.

pub mod config;
pub mod http_client;
pub mod logging;
pub mod parsing;
pub mod scraper_api;

pub use config::{AppConfig, ConfigError, LoggingConfig};
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{LoggingGuard, init_logging};
pub use parsing::{ListingParser, ListingSelectors};
pub use scraper_api::{ApiKey, ScraperApiClient, ScraperApiEndpoints};
