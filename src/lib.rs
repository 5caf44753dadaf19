//! Shelf Scraper - concurrent book listing scraper
//!
//! Fetches search result pages (direct parallel requests or async batch
//! jobs), extracts one record per listed book, enriches each record with
//! structured product details and writes everything to a CSV file whose
//! columns are the union of every attribute seen.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::{RunOutcome, RunSummary, ScrapePipeline, run_scrape};
pub use error::{ScrapeError, ScrapeResult};
