//! Listing entities produced by the acquisition stage

use serde::{Deserialize, Serialize};

/// One raw listing page, tagged with the page number it was requested for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub page_number: u32,
    pub markup: String,
}

impl ListingPage {
    pub fn new(page_number: u32, markup: impl Into<String>) -> Self {
        Self {
            page_number,
            markup: markup.into(),
        }
    }
}

/// A book as it appears on a listing page.
///
/// `item_id` is never empty and is the join key for detail enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub item_id: String,
    pub title: String,
    pub author: String,
    /// `None` when the listing had no info line at all
    pub release_date: Option<String>,
}

/// Sort pages by page number and check that exactly `1..=expected` are present.
///
/// Returns the missing or duplicated page numbers on mismatch.
pub fn order_pages(mut pages: Vec<ListingPage>, expected: u32) -> Result<Vec<ListingPage>, String> {
    pages.sort_by_key(|page| page.page_number);

    let numbers: Vec<u32> = pages.iter().map(|page| page.page_number).collect();
    let wanted: Vec<u32> = (1..=expected).collect();
    if numbers != wanted {
        return Err(format!(
            "expected pages 1..={expected}, got {numbers:?}"
        ));
    }

    Ok(pages)
}
