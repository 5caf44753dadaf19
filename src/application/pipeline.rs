//! Scrape pipeline
//!
//! acquire pages -> extract listing records -> enrich details -> write CSV.
//! Stages run strictly in sequence; each one is concurrent internally.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use super::aggregator::CsvAggregator;
use super::detail_enricher::{DetailEnricher, EnrichmentFailure};
use super::listing_acquirer::{AcquisitionStrategy, ListingAcquirer};
use crate::domain::ListingRecord;
use crate::error::{ScrapeError, ScrapeResult};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::parsing::ListingParser;
use crate::infrastructure::scraper_api::{ApiKey, ScraperApiClient};

/// What a completed run produced
#[derive(Debug)]
pub struct RunSummary {
    pub pages: usize,
    pub items: usize,
    pub columns: usize,
    pub destination: PathBuf,
    pub listing_elapsed: Duration,
    pub enrichment_elapsed: Duration,
    pub total_elapsed: Duration,
    /// Detail fetches that failed under the collect-errors policy
    pub failures: Vec<EnrichmentFailure>,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// No API credential was available; nothing was fetched or written
    Skipped,
}

pub struct ScrapePipeline {
    acquirer: ListingAcquirer,
    parser: ListingParser,
    enricher: DetailEnricher,
    aggregator: CsvAggregator,
    destination: PathBuf,
}

impl ScrapePipeline {
    pub fn new(
        acquirer: ListingAcquirer,
        parser: ListingParser,
        enricher: DetailEnricher,
        aggregator: CsvAggregator,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            acquirer,
            parser,
            enricher,
            aggregator,
            destination: destination.into(),
        }
    }

    /// Wire the pipeline to the scraping API described by `config`
    pub fn from_config(config: &AppConfig, api_key: ApiKey) -> ScrapeResult<Self> {
        let http = HttpClient::new(&config.http)?;
        let client = Arc::new(ScraperApiClient::new(http, api_key, config.api.clone()));

        let acquirer = match config.scrape.strategy {
            AcquisitionStrategy::Direct => ListingAcquirer::Direct {
                source: client.clone(),
                workers: config.scrape.page_workers,
            },
            AcquisitionStrategy::Batch => ListingAcquirer::Batch {
                source: client.clone(),
                poll: config.polling.policy(),
            },
        };

        let delimiter = config
            .output
            .delimiter_byte()
            .map_err(|e| ScrapeError::Config(e.to_string()))?;

        Ok(Self::new(
            acquirer,
            ListingParser::with_config(&config.selectors)?,
            DetailEnricher::new(client, config.output.column_case, config.enrichment.failure_policy),
            CsvAggregator::new(delimiter),
            config.scrape.destination_path.clone(),
        ))
    }

    /// Scrape `number_of_pages` listing pages and write the enriched CSV
    pub async fn run(&self, number_of_pages: u32) -> ScrapeResult<RunSummary> {
        let started = Instant::now();
        info!(
            "Scraping {} pages to {} ({:?} strategy)...",
            number_of_pages,
            self.destination.display(),
            self.acquirer.strategy()
        );

        let pages = self.acquirer.acquire(number_of_pages).await?;
        let listings: Vec<ListingRecord> = pages.iter().flat_map(|page| self.parser.parse_page(page)).collect();
        let listing_elapsed = started.elapsed();
        info!(
            "Scraped {} pages and found {} books {:.2} seconds",
            pages.len(),
            listings.len(),
            listing_elapsed.as_secs_f64()
        );

        let enrichment_started = Instant::now();
        let report = self.enricher.enrich_all(&listings).await?;
        let enrichment_elapsed = enrichment_started.elapsed();
        info!(
            "Fetched additional info for {}: {:.2} seconds",
            report.records.len(),
            enrichment_elapsed.as_secs_f64()
        );

        let schema = self.aggregator.write_file(&self.destination, &report.records)?;
        let total_elapsed = started.elapsed();
        info!("Total completion time: {:.2} seconds", total_elapsed.as_secs_f64());
        info!("Results saved in {}", self.destination.display());

        Ok(RunSummary {
            pages: pages.len(),
            items: report.records.len(),
            columns: schema.len(),
            destination: self.destination.clone(),
            listing_elapsed,
            enrichment_elapsed,
            total_elapsed,
            failures: report.failures,
        })
    }
}

/// Run a full scrape from configuration.
///
/// Without a credential the run is skipped: nothing is fetched and no file
/// is touched.
pub async fn run_scrape(config: &AppConfig, api_key: Option<ApiKey>) -> ScrapeResult<RunOutcome> {
    let Some(api_key) = api_key else {
        info!("No scraping API key configured, skipping the scrape");
        return Ok(RunOutcome::Skipped);
    };

    let pipeline = ScrapePipeline::from_config(config, api_key)?;
    let summary = pipeline.run(config.scrape.number_of_pages).await?;
    Ok(RunOutcome::Completed(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credential_skips_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.scrape.destination_path = dir.path().join("books.csv");

        let outcome = run_scrape(&config, None).await.unwrap();

        assert!(matches!(outcome, RunOutcome::Skipped));
        assert!(!config.scrape.destination_path.exists());
    }

    #[test]
    fn pipeline_builds_for_both_strategies() {
        let mut config = AppConfig::default();
        for strategy in [AcquisitionStrategy::Direct, AcquisitionStrategy::Batch] {
            config.scrape.strategy = strategy;
            let pipeline = ScrapePipeline::from_config(&config, ApiKey::new("key").unwrap()).unwrap();
            assert_eq!(pipeline.acquirer.strategy(), strategy);
        }
    }

    #[test]
    fn invalid_selector_fails_construction() {
        let mut config = AppConfig::default();
        config.selectors.title = "[[[".to_string();
        let result = ScrapePipeline::from_config(&config, ApiKey::new("key").unwrap());
        assert!(matches!(result, Err(ScrapeError::InvalidSelector { .. })));
    }
}
