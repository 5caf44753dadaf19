//! Listing page acquisition
//!
//! Two interchangeable strategies produce the same output: one
//! [`ListingPage`] per page number `1..=n`, sorted by page number.
//!
//! - `Direct`: one spawned task per page, at most `workers` in flight.
//! - `Batch`: submit every page URL as one batch job, then poll each job
//!   concurrently until it reports `finished`.
//!
//! A failure on any page aborts the whole acquisition.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::domain::listing::order_pages;
use crate::domain::{BatchJobSource, JobDescriptor, JobStatus, ListingPage, ListingSource};
use crate::error::{ScrapeError, ScrapeResult};

/// Which acquisition protocol to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionStrategy {
    /// Parallel direct requests, one per page
    Direct,
    /// Async batch job submission, then polling
    #[default]
    Batch,
}

/// Poll pacing for batch jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until the job finishes, however long that takes
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: None,
        }
    }
}

/// Obtains listing pages with the configured strategy
#[derive(Clone)]
pub enum ListingAcquirer {
    Direct {
        source: Arc<dyn ListingSource>,
        workers: usize,
    },
    Batch {
        source: Arc<dyn BatchJobSource>,
        poll: PollPolicy,
    },
}

impl ListingAcquirer {
    pub fn strategy(&self) -> AcquisitionStrategy {
        match self {
            Self::Direct { .. } => AcquisitionStrategy::Direct,
            Self::Batch { .. } => AcquisitionStrategy::Batch,
        }
    }

    /// Fetch pages `1..=number_of_pages`, returned in page order
    pub async fn acquire(&self, number_of_pages: u32) -> ScrapeResult<Vec<ListingPage>> {
        if number_of_pages == 0 {
            return Ok(Vec::new());
        }

        let pages = match self {
            Self::Direct { source, workers } => fetch_direct(source, number_of_pages, *workers).await?,
            Self::Batch { source, poll } => fetch_batch(source.as_ref(), number_of_pages, *poll).await?,
        };

        order_pages(pages, number_of_pages).map_err(|reason| ScrapeError::malformed("listing acquisition", reason))
    }
}

async fn fetch_direct(
    source: &Arc<dyn ListingSource>,
    number_of_pages: u32,
    workers: usize,
) -> ScrapeResult<Vec<ListingPage>> {
    debug!("Fetching {} pages directly with {} workers", number_of_pages, workers);

    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();

    for page_number in 1..=number_of_pages {
        let semaphore = Arc::clone(&semaphore);
        let source = Arc::clone(source);

        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| ScrapeError::Config(format!("page worker pool closed: {e}")))?;
            let markup = source.fetch_page(page_number).await?;
            Ok::<_, ScrapeError>(ListingPage::new(page_number, markup))
        });
    }

    let mut pages = Vec::with_capacity(number_of_pages as usize);
    // Returning early drops the set, which aborts the pages still in flight
    while let Some(joined) = tasks.join_next().await {
        pages.push(joined??);
    }

    Ok(pages)
}

async fn fetch_batch(
    source: &dyn BatchJobSource,
    number_of_pages: u32,
    poll: PollPolicy,
) -> ScrapeResult<Vec<ListingPage>> {
    let page_numbers: Vec<u32> = (1..=number_of_pages).collect();
    let jobs = source.submit(&page_numbers).await?;
    check_descriptors(&jobs, number_of_pages)?;
    info!("Submitted {} batch jobs", jobs.len());

    try_join_all(jobs.into_iter().map(|job| poll_until_finished(source, job, poll))).await
}

/// One descriptor per requested page, each page exactly once
fn check_descriptors(jobs: &[JobDescriptor], number_of_pages: u32) -> ScrapeResult<()> {
    let pages: BTreeSet<u32> = jobs.iter().map(|job| job.page_number).collect();
    let complete = jobs.len() == number_of_pages as usize
        && pages.len() == jobs.len()
        && pages.iter().all(|page| (1..=number_of_pages).contains(page));
    if !complete {
        let submitted: Vec<u32> = jobs.iter().map(|job| job.page_number).collect();
        return Err(ScrapeError::malformed(
            "batch submission",
            format!("expected one job per page 1..={number_of_pages}, got pages {submitted:?}"),
        ));
    }
    Ok(())
}

async fn poll_until_finished(source: &dyn BatchJobSource, job: JobDescriptor, poll: PollPolicy) -> ScrapeResult<ListingPage> {
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match source.poll(&job).await? {
            JobStatus::Finished { body } => {
                info!("Page {} scraped", job.page_number);
                return Ok(ListingPage::new(job.page_number, body));
            }
            JobStatus::Pending { status } => {
                if poll.max_attempts.is_some_and(|max| attempts >= max) {
                    return Err(ScrapeError::PollAttemptsExhausted {
                        page: job.page_number,
                        attempts,
                    });
                }
                debug!(page = job.page_number, attempts, %status, "Waiting for batch job");
                sleep(poll.interval).await;
            }
        }
    }
}
