//! ScraperAPI client
//!
//! Implements the three remote sources the pipeline needs:
//! - direct listing fetches through the proxy endpoint
//! - the async batch job protocol (submit all page URLs, poll each job)
//! - structured product details by item id
//!
//! The API key is passed in at construction; nothing reads it from the
//! environment here.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::http_client::HttpClient;
use crate::domain::constants::site;
use crate::domain::{BatchJobSource, DetailPayload, DetailSource, JobDescriptor, JobStatus, ListingSource};
use crate::error::{ScrapeError, ScrapeResult};

const FINISHED: &str = "finished";

/// API credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// `None` for a missing or blank key
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Endpoints and request parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperApiEndpoints {
    /// Proxy endpoint for direct page fetches
    pub api_base_url: String,
    /// Async batch job submission endpoint
    pub batch_url: String,
    /// Structured product detail endpoint
    pub structured_url: String,
    /// Listing to scrape; `&page={n}` is appended per page
    pub listing_url: String,
    /// Top level domain / region sent as `tld`
    pub region: String,
}

impl Default for ScraperApiEndpoints {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.scraperapi.com".to_string(),
            batch_url: "https://async.scraperapi.com/batchjobs".to_string(),
            structured_url: "https://api.scraperapi.com/structured/amazon/product".to_string(),
            listing_url: site::LISTING_URL.to_string(),
            region: site::DEFAULT_REGION.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchSubmission<'a> {
    api_key: &'a str,
    urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmittedJob {
    status_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobStatusResponse {
    status: Option<String>,
    response: Option<JobResponse>,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    body: Option<String>,
}

/// Client for the scraping API, sharing one HTTP connection pool
#[derive(Debug, Clone)]
pub struct ScraperApiClient {
    http: HttpClient,
    api_key: ApiKey,
    endpoints: ScraperApiEndpoints,
}

impl ScraperApiClient {
    pub fn new(http: HttpClient, api_key: ApiKey, endpoints: ScraperApiEndpoints) -> Self {
        Self { http, api_key, endpoints }
    }

    /// Listing URL for one page, as fetched through the proxy
    pub fn page_url(&self, page_number: u32) -> String {
        format!("{}&page={page_number}", self.endpoints.listing_url)
    }

    /// Listing URL for one page in a batch; `qid` keeps the provider from
    /// serving a cached result of an earlier batch
    fn batch_page_url(&self, page_number: u32, qid: i64) -> String {
        format!("{}&qid={qid}&page={page_number}", self.endpoints.listing_url)
    }
}

#[async_trait]
impl ListingSource for ScraperApiClient {
    async fn fetch_page(&self, page_number: u32) -> ScrapeResult<String> {
        let target = self.page_url(page_number);
        let markup = self
            .http
            .get_text(
                &self.endpoints.api_base_url,
                &[
                    ("api_key", self.api_key.expose()),
                    ("tld", self.endpoints.region.as_str()),
                    ("url", target.as_str()),
                ],
            )
            .await?;
        info!("Processing page: {}", page_number);
        Ok(markup)
    }
}

#[async_trait]
impl BatchJobSource for ScraperApiClient {
    async fn submit(&self, page_numbers: &[u32]) -> ScrapeResult<Vec<JobDescriptor>> {
        let qid = chrono::Utc::now().timestamp();
        let submission = BatchSubmission {
            api_key: self.api_key.expose(),
            urls: page_numbers.iter().map(|&page| self.batch_page_url(page, qid)).collect(),
        };

        let jobs: Vec<SubmittedJob> = self.http.post_json(&self.endpoints.batch_url, &submission).await?;
        if jobs.len() != page_numbers.len() {
            return Err(ScrapeError::malformed(
                &self.endpoints.batch_url,
                format!("submitted {} pages, got {} job descriptors", page_numbers.len(), jobs.len()),
            ));
        }

        jobs.into_iter()
            .zip(page_numbers)
            .map(|(job, &page_number)| -> ScrapeResult<JobDescriptor> {
                let status_url = job.status_url.ok_or_else(|| {
                    ScrapeError::malformed(&self.endpoints.batch_url, format!("job for page {page_number} has no statusUrl"))
                })?;
                Ok(JobDescriptor { page_number, status_url })
            })
            .collect()
    }

    async fn poll(&self, job: &JobDescriptor) -> ScrapeResult<JobStatus> {
        let response: JobStatusResponse = self.http.get_json(&job.status_url, &[]).await?;
        let status = response
            .status
            .ok_or_else(|| ScrapeError::malformed(&job.status_url, "missing status"))?;

        if status != FINISHED {
            debug!(page = job.page_number, %status, "Batch job still in progress");
            return Ok(JobStatus::Pending { status });
        }

        let body = response
            .response
            .and_then(|r| r.body)
            .ok_or_else(|| ScrapeError::malformed(&job.status_url, "finished job has no response.body"))?;
        Ok(JobStatus::Finished { body })
    }
}

#[async_trait]
impl DetailSource for ScraperApiClient {
    async fn fetch_detail(&self, item_id: &str) -> ScrapeResult<DetailPayload> {
        let value: Value = self
            .http
            .get_json(
                &self.endpoints.structured_url,
                &[
                    ("api_key", self.api_key.expose()),
                    ("tld", self.endpoints.region.as_str()),
                    ("asin", item_id),
                ],
            )
            .await?;

        DetailPayload::from_value(value).ok_or_else(|| {
            ScrapeError::malformed(&self.endpoints.structured_url, format!("detail for {item_id} is not a JSON object"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::HttpClientConfig;

    fn client() -> ScraperApiClient {
        let http = HttpClient::new(&HttpClientConfig::default()).unwrap();
        let endpoints = ScraperApiEndpoints {
            listing_url: "https://shop.example/s?i=books".to_string(),
            ..Default::default()
        };
        ScraperApiClient::new(http, ApiKey::new("secret").unwrap(), endpoints)
    }

    #[test]
    fn blank_api_key_is_absent() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   ").is_none());
        assert_eq!(ApiKey::new(" k ").unwrap().expose(), "k");
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("very-secret").unwrap();
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
    }

    #[test]
    fn page_urls_carry_page_number() {
        let client = client();
        assert_eq!(client.page_url(3), "https://shop.example/s?i=books&page=3");
        assert_eq!(client.batch_page_url(2, 1_700_000_000), "https://shop.example/s?i=books&qid=1700000000&page=2");
    }

    #[test]
    fn status_response_decodes_finished_body() {
        let parsed: JobStatusResponse =
            serde_json::from_str(r#"{"status":"finished","response":{"body":"<html></html>","statusCode":200}}"#).unwrap();
        assert_eq!(parsed.status.as_deref(), Some("finished"));
        assert_eq!(parsed.response.and_then(|r| r.body).as_deref(), Some("<html></html>"));
    }

    #[test]
    fn submitted_job_without_status_url_decodes_as_none() {
        let jobs: Vec<SubmittedJob> = serde_json::from_str(r#"[{"id":"1","statusUrl":"https://s/1"},{"id":"2"}]"#).unwrap();
        assert_eq!(jobs[0].status_url.as_deref(), Some("https://s/1"));
        assert!(jobs[1].status_url.is_none());
    }
}
