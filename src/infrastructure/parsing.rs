//! HTML parsing for listing pages
//!
//! Selector configuration and the listing parser built from it.

pub mod config;
pub mod listing_parser;

pub use config::ListingSelectors;
pub use listing_parser::ListingParser;
