//! shelf-scraper binary
//!
//! Loads configuration, applies CLI overrides, initializes logging and runs
//! one scrape.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use shelf_scraper_lib::application::{AcquisitionStrategy, RunOutcome, run_scrape};
use shelf_scraper_lib::infrastructure::config::{AppConfig, defaults};
use shelf_scraper_lib::infrastructure::{ApiKey, init_logging};

#[derive(Parser, Debug)]
#[command(name = "shelf-scraper", version)]
#[command(about = "Scrape new book releases and export them, enriched with product details, to CSV")]
struct Cli {
    /// CSV file to write [default: scraped_french_books.csv]
    #[arg(short = 'd', long)]
    destination_path: Option<PathBuf>,

    /// Number of listing pages to scrape [default: 20]
    #[arg(short = 'p', long)]
    number_of_pages: Option<u32>,

    /// Log file, appended to [default: amazon_scraping.log]
    #[arg(short = 'l', long)]
    log_file: Option<PathBuf>,

    /// How listing pages are fetched [default: batch]
    #[arg(short = 's', long, value_enum)]
    strategy: Option<AcquisitionStrategy>,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Flags given on the command line win over every other layer
    fn apply(self, config: &mut AppConfig) {
        if let Some(path) = self.destination_path {
            config.scrape.destination_path = path;
        }
        if let Some(pages) = self.number_of_pages {
            config.scrape.number_of_pages = pages;
        }
        if let Some(log_file) = self.log_file {
            config.logging.log_file = log_file;
        }
        if let Some(strategy) = self.strategy {
            config.scrape.strategy = strategy;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let _logging = init_logging(&config.logging).context("Failed to initialize logging")?;

    let api_key = std::env::var(defaults::API_KEY_ENV).ok().and_then(ApiKey::new);

    match run_scrape(&config, api_key).await.context("Scrape failed")? {
        RunOutcome::Completed(summary) => {
            for failure in &summary.failures {
                warn!("No details for {}: {}", failure.item_id, failure.error);
            }
            info!(
                "Wrote {} books ({} columns) from {} pages to {}",
                summary.items,
                summary.columns,
                summary.pages,
                summary.destination.display()
            );
        }
        RunOutcome::Skipped => {
            info!("Set {} to run the scraper", defaults::API_KEY_ENV);
        }
    }

    Ok(())
}
