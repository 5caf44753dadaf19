//! Normalization of free-form `product_information` attributes
//!
//! Keys are canonicalized so that the same attribute spelled with different
//! casing, spacing or invisible marks lands in one column. Keys on the ignore
//! list are dropped; the ignore check also folds French accents so `Relié`
//! matches `relie`. The transform is idempotent.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::domain::constants::{IGNORED_DETAIL_KEYS, INVISIBLE_MARKS};

/// Cleaned attribute mapping, keyed by canonical key
pub type NormalizedFields = BTreeMap<String, Value>;

/// Canonical form of an attribute key.
///
/// Invisible marks and apostrophes are removed, the key is trimmed and
/// lower-cased, and every run of whitespace or hyphens becomes one `_`.
pub fn canonical_key(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !INVISIBLE_MARKS.contains(c)).collect();
    let lowered = stripped.trim().to_lowercase();

    let mut key = String::with_capacity(lowered.len());
    let mut in_separator = false;
    for c in lowered.chars() {
        if c == '\'' || c == '\u{2019}' {
            continue;
        }
        if c.is_whitespace() || c == '-' {
            if !in_separator {
                key.push('_');
                in_separator = true;
            }
        } else {
            key.push(c);
            in_separator = false;
        }
    }
    key
}

/// Remove invisible marks and semicolons, then trim
pub fn clean_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != ';' && !INVISIBLE_MARKS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Strip diacritics from the Latin letters French text uses
fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ÿ' => 'y',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

pub fn is_ignored(canonical: &str) -> bool {
    let folded = fold_accents(canonical);
    IGNORED_DETAIL_KEYS.contains(&folded.as_str())
}

/// Normalize one attribute mapping.
///
/// String values are cleaned with [`clean_text`]; every other value passes
/// through untouched. When two raw keys share a canonical form the later one
/// in iteration order wins.
pub fn normalize_fields(raw: &Map<String, Value>) -> NormalizedFields {
    let mut normalized = NormalizedFields::new();

    for (key, value) in raw {
        let key = canonical_key(key);
        if is_ignored(&key) {
            continue;
        }

        let value = match value {
            Value::String(text) => Value::String(clean_text(text)),
            other => other.clone(),
        };
        normalized.insert(key, value);
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn canonicalizes_keys_and_cleans_values() {
        let raw = as_map(json!({
            "\u{200e}Langue \u{200e}": "\u{200e} Français ;",
            "Nombre de pages": 320,
            "Éditeur": "Gallimard; 1re édition",
        }));

        let normalized = normalize_fields(&raw);

        assert_eq!(normalized.get("langue"), Some(&json!("Français")));
        assert_eq!(normalized.get("nombre_de_pages"), Some(&json!(320)));
        assert_eq!(normalized.get("éditeur"), Some(&json!("Gallimard 1re édition")));
        assert_eq!(normalized.len(), 3);
    }

    #[test]
    fn non_string_values_pass_through() {
        let raw = as_map(json!({
            "Classement": {"rank": 12, "category": "Romans"},
            "Disponible": true,
            "Notes": null,
        }));

        let normalized = normalize_fields(&raw);

        assert_eq!(normalized.get("classement"), Some(&json!({"rank": 12, "category": "Romans"})));
        assert_eq!(normalized.get("disponible"), Some(&json!(true)));
        assert_eq!(normalized.get("notes"), Some(&Value::Null));
    }

    #[rstest]
    #[case("ASIN")]
    #[case("ISBN-10")]
    #[case("ISBN-13")]
    #[case("isbn 10")]
    #[case("  Isbn_13\u{200e}")]
    #[case("Poids de l'article")]
    #[case("Poids de l’article")]
    #[case("Dimensions")]
    #[case("\u{200e}DIMENSIONS\u{200e}")]
    #[case("Relie")]
    #[case("Relié")]
    #[case("Taille du fichier")]
    #[case("Utilisation simultanée de l'appareil")]
    #[case("Pense-bêtes")]
    #[case("Lecteur d'écran")]
    #[case("Pagination - ISBN de l'édition imprimée de référence")]
    fn ignored_keys_never_survive(#[case] key: &str) {
        let mut raw = Map::new();
        raw.insert(key.to_string(), json!("value"));
        raw.insert("Langue".to_string(), json!("Français"));

        let normalized = normalize_fields(&raw);

        assert_eq!(normalized.keys().collect::<Vec<_>>(), vec!["langue"], "{key} survived");
    }

    #[test]
    fn accents_are_kept_in_surviving_keys() {
        let raw = as_map(json!({"Éditeur": "Gallimard", "Date de publication": "3 mars 2024"}));
        let normalized = normalize_fields(&raw);
        assert!(normalized.contains_key("éditeur"));
        assert!(normalized.contains_key("date_de_publication"));
    }

    #[test]
    fn colliding_keys_keep_one_entry() {
        let raw = as_map(json!({"Langue": "Français", "langue ": "Anglais"}));
        let normalized = normalize_fields(&raw);
        assert_eq!(normalized.len(), 1);
    }

    fn raw_key() -> impl Strategy<Value = String> {
        let piece = prop_oneof![
            Just("ISBN-10".to_string()),
            Just("Langue".to_string()),
            Just("\u{200e}".to_string()),
            Just(" ".to_string()),
            Just("-".to_string()),
            Just("'".to_string()),
            "[A-Za-zéÉ_]{1,6}",
        ];
        prop::collection::vec(piece, 1..5).prop_map(|parts| parts.concat())
    }

    fn raw_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            "[ ;a-zé\u{200e}]{0,12}".prop_map(Value::String),
            any::<i64>().prop_map(|n| json!(n)),
            any::<bool>().prop_map(Value::Bool),
            Just(Value::Null),
        ]
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(entries in prop::collection::btree_map(raw_key(), raw_value(), 0..8)) {
            let raw: Map<String, Value> = entries.into_iter().collect();
            let once = normalize_fields(&raw);
            let again_input: Map<String, Value> = once.clone().into_iter().collect();
            let twice = normalize_fields(&again_input);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn canonical_keys_are_fixed_points(raw in raw_key()) {
            let key = canonical_key(&raw);
            prop_assert_eq!(canonical_key(&key), key);
        }
    }
}
