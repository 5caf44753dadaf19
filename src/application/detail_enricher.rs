//! Detail enrichment
//!
//! Fetches one detail payload per listing record, all concurrently, and
//! merges brand plus the normalized product information into an
//! [`EnrichedRecord`]. Output order always follows input order.

use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::field_normalizer::normalize_fields;
use crate::domain::{ColumnCase, DetailSource, EnrichedRecord, ListingRecord};
use crate::error::{ScrapeError, ScrapeResult};

/// What a single failed detail request does to the batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentPolicy {
    /// First failure fails the whole enrichment
    #[default]
    AbortBatch,
    /// Await every request, report failures next to the successful records
    CollectErrors,
}

#[derive(Debug)]
pub struct EnrichmentFailure {
    pub item_id: String,
    pub error: ScrapeError,
}

/// Successful records in input order plus any collected failures
#[derive(Debug, Default)]
pub struct EnrichmentReport {
    pub records: Vec<EnrichedRecord>,
    pub failures: Vec<EnrichmentFailure>,
}

impl EnrichmentReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct DetailEnricher {
    source: Arc<dyn DetailSource>,
    column_case: ColumnCase,
    policy: EnrichmentPolicy,
}

impl DetailEnricher {
    pub fn new(source: Arc<dyn DetailSource>, column_case: ColumnCase, policy: EnrichmentPolicy) -> Self {
        Self {
            source,
            column_case,
            policy,
        }
    }

    /// Fetch and merge details for one listing record
    pub async fn enrich_one(&self, listing: &ListingRecord) -> ScrapeResult<EnrichedRecord> {
        let payload = self.source.fetch_detail(&listing.item_id).await?;
        info!("Getting detailed info: {}:{}", listing.title, listing.item_id);

        let normalized = normalize_fields(&payload.product_information());
        Ok(EnrichedRecord::merge(listing, payload.brand(), normalized, self.column_case))
    }

    /// Enrich every record according to the configured policy
    pub async fn enrich_all(&self, listings: &[ListingRecord]) -> ScrapeResult<EnrichmentReport> {
        match self.policy {
            EnrichmentPolicy::AbortBatch => {
                let records = try_join_all(listings.iter().map(|listing| self.enrich_one(listing))).await?;
                Ok(EnrichmentReport {
                    records,
                    failures: Vec::new(),
                })
            }
            EnrichmentPolicy::CollectErrors => {
                let results = join_all(listings.iter().map(|listing| self.enrich_one(listing))).await;

                let mut report = EnrichmentReport::default();
                for (listing, result) in listings.iter().zip(results) {
                    match result {
                        Ok(record) => report.records.push(record),
                        Err(error) => {
                            warn!("Failed to fetch details for {}: {}", listing.item_id, error);
                            report.failures.push(EnrichmentFailure {
                                item_id: listing.item_id.clone(),
                                error,
                            });
                        }
                    }
                }
                Ok(report)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DetailPayload;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::time::Duration;

    /// Detail source answering from a fixed table; unknown ids fail
    struct TableDetailSource {
        payloads: HashMap<String, Value>,
    }

    impl TableDetailSource {
        fn new(entries: &[(&str, Value)]) -> Arc<Self> {
            Arc::new(Self {
                payloads: entries.iter().map(|(id, v)| ((*id).to_string(), v.clone())).collect(),
            })
        }
    }

    #[async_trait]
    impl DetailSource for TableDetailSource {
        async fn fetch_detail(&self, item_id: &str) -> ScrapeResult<DetailPayload> {
            // earlier ids answer later, so completion order differs from input order
            let delay = 50u64.saturating_sub(item_id.len() as u64 * 10);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            let value = self
                .payloads
                .get(item_id)
                .cloned()
                .ok_or_else(|| ScrapeError::HttpStatus {
                    status: 500,
                    url: format!("https://details.test/{item_id}"),
                })?;
            DetailPayload::from_value(value).ok_or_else(|| ScrapeError::malformed(item_id, "not an object"))
        }
    }

    fn listing(id: &str) -> ListingRecord {
        ListingRecord {
            item_id: id.to_string(),
            title: format!("Title {id}"),
            author: "Author".to_string(),
            release_date: Some("1 janvier 2024".to_string()),
        }
    }

    #[tokio::test]
    async fn merges_brand_and_normalized_fields() {
        let source = TableDetailSource::new(&[(
            "A1",
            json!({"brand": "Gallimard", "product_information": {"Langue\u{200e}": " Français ", "ISBN-13": "978"}}),
        )]);
        let enricher = DetailEnricher::new(source, ColumnCase::Canonical, EnrichmentPolicy::AbortBatch);

        let record = enricher.enrich_one(&listing("A1")).await.unwrap();

        assert_eq!(record.cell("Brand"), "Gallimard");
        assert_eq!(record.cell("langue"), "Français");
        assert!(record.get("isbn_13").is_none());
        assert_eq!(record.cell("Release Date"), "1 janvier 2024");
    }

    #[tokio::test]
    async fn missing_brand_and_information_use_defaults() {
        let source = TableDetailSource::new(&[("A1", json!({"name": "x"}))]);
        let enricher = DetailEnricher::new(source, ColumnCase::Capitalized, EnrichmentPolicy::AbortBatch);

        let record = enricher.enrich_one(&listing("A1")).await.unwrap();

        assert_eq!(record.cell("Brand"), "N/A");
        assert_eq!(record.column_names().count(), 5);
    }

    #[tokio::test]
    async fn output_follows_input_order() {
        let source = TableDetailSource::new(&[
            ("A", json!({"brand": "1"})),
            ("BB", json!({"brand": "2"})),
            ("CCC", json!({"brand": "3"})),
        ]);
        let enricher = DetailEnricher::new(source, ColumnCase::Capitalized, EnrichmentPolicy::AbortBatch);
        let listings = vec![listing("CCC"), listing("A"), listing("BB")];

        let report = enricher.enrich_all(&listings).await.unwrap();

        let ids: Vec<&str> = report.records.iter().map(EnrichedRecord::item_id).collect();
        assert_eq!(ids, vec!["CCC", "A", "BB"]);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn abort_batch_fails_on_first_error() {
        let source = TableDetailSource::new(&[("A1", json!({"brand": "B1"}))]);
        let enricher = DetailEnricher::new(source, ColumnCase::Capitalized, EnrichmentPolicy::AbortBatch);

        let result = enricher.enrich_all(&[listing("A1"), listing("MISSING")]).await;
        assert!(matches!(result, Err(ScrapeError::HttpStatus { status: 500, .. })));
    }

    #[tokio::test]
    async fn collect_errors_reports_failures_and_keeps_the_rest() {
        let source = TableDetailSource::new(&[("A1", json!({"brand": "B1"})), ("A3", json!({"brand": "B3"}))]);
        let enricher = DetailEnricher::new(source, ColumnCase::Capitalized, EnrichmentPolicy::CollectErrors);

        let report = enricher
            .enrich_all(&[listing("A1"), listing("A2"), listing("A3")])
            .await
            .unwrap();

        let ids: Vec<&str> = report.records.iter().map(EnrichedRecord::item_id).collect();
        assert_eq!(ids, vec!["A1", "A3"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].item_id, "A2");
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn non_object_payload_is_malformed() {
        let source = TableDetailSource::new(&[("A1", json!(["not", "an", "object"]))]);
        let enricher = DetailEnricher::new(source, ColumnCase::Capitalized, EnrichmentPolicy::AbortBatch);

        let result = enricher.enrich_one(&listing("A1")).await;
        assert!(matches!(result, Err(ScrapeError::MalformedResponse { .. })));
    }
}
