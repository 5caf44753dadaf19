//! Domain constants for the book listing scrape
//!
//! Site characteristics, sentinel values and the fixed output columns.

/// Listing site characteristics
pub mod site {
    /// New-release French books listing, sorted by publication date.
    /// Page numbers are appended as `&page={n}`.
    pub const LISTING_URL: &str = "https://www.amazon.fr/s?i=stripbooks&bbn=301061&rh=n%3A301139%2Cp_n_publication_date%3A183196031%2Cp_n_feature_browse-bin%3A5272956031%2Cp_n_binding_browse-bin%3A3973586031%7C492480011%7C492481011&s=date-desc-rank&dc";

    /// Region (top level domain) passed to the scraping API
    pub const DEFAULT_REGION: &str = "fr";
}

/// Value substituted when a listing node or detail field is missing
pub const NOT_AVAILABLE: &str = "N/A";

/// Fixed output columns, in output order
pub mod columns {
    pub const ITEM_ID: &str = "ASIN";
    pub const TITLE: &str = "Title";
    pub const AUTHOR: &str = "Author";
    pub const BRAND: &str = "Brand";
    pub const RELEASE_DATE: &str = "Release Date";

    pub const CORE: [&str; 5] = [ITEM_ID, TITLE, AUTHOR, BRAND, RELEASE_DATE];
}

/// Canonical `product_information` keys dropped during normalization.
///
/// Internal identifiers and physical/format details that add columns without
/// adding information to the export.
pub const IGNORED_DETAIL_KEYS: &[&str] = &[
    "asin",
    "poids_de_larticle",
    "relie",
    "taille_du_fichier",
    "utilisation_simultanee_de_lappareil",
    "pagination_isbn_de_ledition_imprimee_de_reference",
    "dimensions",
    "isbn_10",
    "isbn_13",
    "pense_betes",
    "lecteur_decran",
];

/// Zero-width and directional marks the provider leaves in keys and values
pub const INVISIBLE_MARKS: &[char] = &[
    '\u{200b}', '\u{200c}', '\u{200d}', '\u{200e}', '\u{200f}', '\u{feff}',
];
