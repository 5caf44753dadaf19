//! HTTP client shared by every remote call
//!
//! Wraps one `reqwest::Client`, so all page, poll and detail requests share a
//! single connection pool. No request timeout is applied unless configured.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ScrapeError, ScrapeResult};

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout_seconds: Option<u64>,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "shelf-scraper/0.2".to_string(),
            timeout_seconds: None,
            pool_max_idle_per_host: 32,
        }
    }
}

/// Thin wrapper over a pooled `reqwest::Client`. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &HttpClientConfig) -> ScrapeResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ScrapeError::Config(format!("Invalid user agent: {e}")))?,
        );

        let mut builder = Client::builder()
            .default_headers(headers)
            .pool_max_idle_per_host(config.pool_max_idle_per_host);
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        let client = builder
            .build()
            .map_err(|e| ScrapeError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET with query parameters and return the body as text
    pub async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> ScrapeResult<String> {
        let response = self.send_get(url, query).await?;
        response
            .text()
            .await
            .map_err(|e| ScrapeError::transport(url, format!("Failed to read response body: {e}")))
    }

    /// GET with query parameters and decode a JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> ScrapeResult<T> {
        let response = self.send_get(url, query).await?;
        decode_json(url, response).await
    }

    /// POST a JSON body and decode a JSON response
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> ScrapeResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ScrapeError::transport(url, e))?;
        let response = ensure_success(url, response)?;
        decode_json(url, response).await
    }

    async fn send_get(&self, url: &str, query: &[(&str, &str)]) -> ScrapeResult<Response> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .query(query)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| ScrapeError::transport(url, e))?;
        ensure_success(url, response)
    }
}

fn ensure_success(url: &str, response: Response) -> ScrapeResult<Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response)
}

async fn decode_json<T: DeserializeOwned>(url: &str, response: Response) -> ScrapeResult<T> {
    let body = response
        .text()
        .await
        .map_err(|e| ScrapeError::transport(url, format!("Failed to read response body: {e}")))?;
    serde_json::from_str(&body).map_err(|e| ScrapeError::malformed(url, e.to_string()))
}
