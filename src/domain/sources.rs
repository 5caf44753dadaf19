//! Remote source interfaces
//!
//! The pipeline only talks to these traits; `ScraperApiClient` implements all
//! three against the real service and tests use in-memory fakes.

use async_trait::async_trait;

use super::detail_payload::DetailPayload;
use crate::error::ScrapeResult;

/// Fetches one listing page directly
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_page(&self, page_number: u32) -> ScrapeResult<String>;
}

/// Handle for one submitted batch job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    pub page_number: u32,
    pub status_url: String,
}

/// Result of one status poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending { status: String },
    Finished { body: String },
}

/// Asynchronous batch job protocol: submit all pages once, then poll each job
#[async_trait]
pub trait BatchJobSource: Send + Sync {
    /// Submit one job per page number. Descriptors come back in submission order.
    async fn submit(&self, page_numbers: &[u32]) -> ScrapeResult<Vec<JobDescriptor>>;

    async fn poll(&self, job: &JobDescriptor) -> ScrapeResult<JobStatus>;
}

/// Fetches the structured detail payload for one item
#[async_trait]
pub trait DetailSource: Send + Sync {
    async fn fetch_detail(&self, item_id: &str) -> ScrapeResult<DetailPayload>;
}
