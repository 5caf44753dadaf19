//! Error types for the scrape pipeline
//!
//! Transport and malformed-response errors from any single request abort the
//! stage that issued it. Missing listing nodes are not errors; the extractor
//! substitutes the `N/A` sentinel instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP request failed with status {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Malformed response from {context}: {reason}")]
    MalformedResponse { context: String, reason: String },

    #[error("Batch job for page {page} not finished after {attempts} polls")]
    PollAttemptsExhausted { page: u32, attempts: u32 },

    #[error("Page fetch task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to write output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    pub fn transport(url: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Transport {
            url: url.into(),
            message: error.to_string(),
        }
    }

    pub fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
