//! Parsing configuration for listing extraction
//!
//! Centralized CSS selectors for the listing markup.

use serde::{Deserialize, Serialize};

/// CSS selectors for listing pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    /// One element per listed item, carrying the item id attribute
    pub item_container: String,

    /// Attribute on the container holding the item id
    pub item_id_attribute: String,

    /// Title text, relative to the container
    pub title: String,

    /// `author | release date` line, relative to the container
    pub info: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            item_container: "div[data-asin]".to_string(),
            item_id_attribute: "data-asin".to_string(),
            title: "h2 a span".to_string(),
            info: "div.a-row.a-size-base.a-color-secondary .a-row".to_string(),
        }
    }
}
