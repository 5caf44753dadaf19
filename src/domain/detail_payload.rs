//! Detail payload returned by the structured product endpoint
//!
//! The provider decides which keys exist. Every field the pipeline reads is
//! listed in [`DetailField`] together with its default when the provider
//! leaves it out, so call sites never carry their own fallbacks.

use serde_json::{Map, Value};

use super::constants::NOT_AVAILABLE;

/// Fields read from a [`DetailPayload`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    /// Publisher / brand name. Absent or null -> `"N/A"`.
    Brand,
    /// Free-form attribute table. Absent or not an object -> empty mapping.
    ProductInformation,
}

impl DetailField {
    pub const fn key(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::ProductInformation => "product_information",
        }
    }

    /// Text used when a text field is missing
    pub const fn text_default(self) -> &'static str {
        match self {
            Self::Brand | Self::ProductInformation => NOT_AVAILABLE,
        }
    }
}

/// JSON object returned for one item id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailPayload {
    fields: Map<String, Value>,
}

impl DetailPayload {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Accepts only JSON objects; anything else is not a detail payload
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Text value of `field`, falling back to the field's declared default.
    ///
    /// Non-string scalars are rendered as their JSON text.
    pub fn text_field(&self, field: DetailField) -> String {
        match self.fields.get(field.key()) {
            None | Some(Value::Null) => field.text_default().to_string(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Object value of `field`; empty when absent or not an object
    pub fn object_field(&self, field: DetailField) -> Map<String, Value> {
        match self.fields.get(field.key()) {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }

    pub fn brand(&self) -> String {
        self.text_field(DetailField::Brand)
    }

    pub fn product_information(&self) -> Map<String, Value> {
        self.object_field(DetailField::ProductInformation)
    }
}
