//! Application layer
//!
//! The scrape stages and the pipeline that runs them in order.

pub mod aggregator;
pub mod detail_enricher;
pub mod field_normalizer;
pub mod listing_acquirer;
pub mod pipeline;

pub use aggregator::{CsvAggregator, OutputSchema};
pub use detail_enricher::{DetailEnricher, EnrichmentFailure, EnrichmentPolicy, EnrichmentReport};
pub use field_normalizer::{NormalizedFields, canonical_key, normalize_fields};
pub use listing_acquirer::{AcquisitionStrategy, ListingAcquirer, PollPolicy};
pub use pipeline::{RunOutcome, RunSummary, ScrapePipeline, run_scrape};
