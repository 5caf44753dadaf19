//! Listing page parser
//!
//! Extracts [`ListingRecord`]s from one search results page. Missing title or
//! info nodes are filled with the `N/A` sentinel; an info line without a
//! release date segment gets `N/A` too. Only a missing info node leaves the
//! release date out. Containers without an item id are skipped.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::config::ListingSelectors;
use crate::domain::constants::NOT_AVAILABLE;
use crate::domain::{ListingPage, ListingRecord};
use crate::error::{ScrapeError, ScrapeResult};

/// Parser for extracting listing records from search result pages
#[derive(Debug, Clone)]
pub struct ListingParser {
    item_container: Selector,
    item_id_attribute: String,
    title: Selector,
    info: Selector,
}

impl ListingParser {
    /// Create a parser with the default selectors
    pub fn new() -> ScrapeResult<Self> {
        Self::with_config(&ListingSelectors::default())
    }

    /// Create a parser with custom selector configuration
    pub fn with_config(selectors: &ListingSelectors) -> ScrapeResult<Self> {
        Ok(Self {
            item_container: compile_selector(&selectors.item_container)?,
            item_id_attribute: selectors.item_id_attribute.clone(),
            title: compile_selector(&selectors.title)?,
            info: compile_selector(&selectors.info)?,
        })
    }

    /// Parse one page
    pub fn parse_page(&self, page: &ListingPage) -> Vec<ListingRecord> {
        let records = self.parse_markup(&page.markup);
        debug!("Extracted {} records from page {}", records.len(), page.page_number);
        records
    }

    /// Parse raw markup into listing records, in document order
    pub fn parse_markup(&self, markup: &str) -> Vec<ListingRecord> {
        let document = Html::parse_document(markup);
        document
            .select(&self.item_container)
            .filter_map(|element| self.extract_record(&element))
            .collect()
    }

    fn extract_record(&self, element: &ElementRef) -> Option<ListingRecord> {
        let item_id = element
            .value()
            .attr(&self.item_id_attribute)
            .map(str::trim)
            .filter(|id| !id.is_empty())?
            .to_string();

        let title = element
            .select(&self.title)
            .next()
            .map_or_else(|| NOT_AVAILABLE.to_string(), |node| clean_string(&node_text(&node)));

        let (author, release_date) = match element.select(&self.info).next() {
            Some(node) => {
                let text = node_text(&node);
                let mut segments = text.split('|');
                let author = clean_string(segments.next().unwrap_or_default());
                let release_date = segments
                    .next()
                    .map_or_else(|| NOT_AVAILABLE.to_string(), clean_string);
                (author, Some(release_date))
            }
            None => (NOT_AVAILABLE.to_string(), None),
        };

        Some(ListingRecord {
            item_id,
            title,
            author,
            release_date,
        })
    }
}

fn compile_selector(selector: &str) -> ScrapeResult<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn node_text(node: &ElementRef) -> String {
    node.text().collect::<String>()
}

/// Trim and drop semicolons, which break naive CSV consumers downstream
fn clean_string(text: &str) -> String {
    text.trim().replace(';', "")
}
