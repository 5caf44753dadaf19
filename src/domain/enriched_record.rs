//! Enriched record: listing core columns merged with normalized detail fields

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::constants::columns;
use super::listing::ListingRecord;

/// How normalized detail keys become column names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnCase {
    /// First character upper-cased, the rest lower-cased (`langue` -> `Langue`)
    #[default]
    Capitalized,
    /// Keep the canonical key as produced by the normalizer
    Canonical,
}

impl ColumnCase {
    pub fn apply(self, key: &str) -> String {
        match self {
            Self::Canonical => key.to_string(),
            Self::Capitalized => {
                let mut chars = key.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

/// One output row, keyed by column name
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    item_id: String,
    columns: BTreeMap<String, Value>,
}

impl EnrichedRecord {
    /// Core columns are written first, then the normalized fields on top.
    /// A normalized key equal to a core column name replaces the core value.
    pub fn merge(
        listing: &ListingRecord,
        brand: String,
        normalized: BTreeMap<String, Value>,
        case: ColumnCase,
    ) -> Self {
        let mut row = BTreeMap::new();
        row.insert(columns::ITEM_ID.to_string(), Value::String(listing.item_id.clone()));
        row.insert(columns::TITLE.to_string(), Value::String(listing.title.clone()));
        row.insert(columns::AUTHOR.to_string(), Value::String(listing.author.clone()));
        row.insert(columns::BRAND.to_string(), Value::String(brand));
        if let Some(release_date) = &listing.release_date {
            row.insert(columns::RELEASE_DATE.to_string(), Value::String(release_date.clone()));
        }

        for (key, value) in normalized {
            row.insert(case.apply(&key), value);
        }

        Self {
            item_id: listing.item_id.clone(),
            columns: row,
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Cell text for CSV output. Missing and null cells are empty,
    /// other non-string values are rendered as JSON.
    pub fn cell(&self, column: &str) -> String {
        match self.columns.get(column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing(release_date: Option<&str>) -> ListingRecord {
        ListingRecord {
            item_id: "A1".into(),
            title: "T1".into(),
            author: "Someone".into(),
            release_date: release_date.map(str::to_string),
        }
    }

    #[test]
    fn capitalize_matches_python_semantics() {
        assert_eq!(ColumnCase::Capitalized.apply("langue"), "Langue");
        assert_eq!(ColumnCase::Capitalized.apply("nombre_de_pages"), "Nombre_de_pages");
        assert_eq!(ColumnCase::Capitalized.apply("éditeur"), "Éditeur");
        assert_eq!(ColumnCase::Capitalized.apply("ABC"), "Abc");
        assert_eq!(ColumnCase::Capitalized.apply(""), "");
        assert_eq!(ColumnCase::Canonical.apply("langue"), "langue");
    }

    #[test]
    fn merge_sets_core_then_normalized() {
        let mut normalized = BTreeMap::new();
        normalized.insert("langue".to_string(), json!("Français"));
        normalized.insert("pages".to_string(), json!(320));

        let record = EnrichedRecord::merge(&listing(Some("3 mars 2024")), "B1".into(), normalized, ColumnCase::Capitalized);

        assert_eq!(record.item_id(), "A1");
        assert_eq!(record.cell("Brand"), "B1");
        assert_eq!(record.cell("Release Date"), "3 mars 2024");
        assert_eq!(record.cell("Langue"), "Français");
        assert_eq!(record.cell("Pages"), "320");
    }

    #[test]
    fn missing_release_date_leaves_cell_empty() {
        let record = EnrichedRecord::merge(&listing(None), "B1".into(), BTreeMap::new(), ColumnCase::Canonical);
        assert!(record.get("Release Date").is_none());
        assert_eq!(record.cell("Release Date"), "");
    }

    #[test]
    fn normalized_key_overrides_core_on_exact_match() {
        let mut normalized = BTreeMap::new();
        normalized.insert("Brand".to_string(), json!("Override"));

        let record = EnrichedRecord::merge(&listing(None), "B1".into(), normalized, ColumnCase::Canonical);
        assert_eq!(record.cell("Brand"), "Override");
    }
}
