//! Attribute schema translation
//!
//! Converts a block's field definitions into the attribute schema handed to the
//! host's block registration API. Every field becomes one [`AttributeSpec`];
//! array fields never carry a default and always describe their items, so the
//! editor does not auto-fill empty arrays with the field default.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::block::{BlockDefinition, FieldDefinition, DEFAULT_FIELD_TYPE};

/// Attribute schema of one block, keyed by field name in declaration order
pub type AttributeSchema = IndexMap<String, AttributeSpec>;

/// Schema entry for a single attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// Attribute type
    #[serde(rename = "type")]
    pub attr_type: String,
    /// Default value (never present for array attributes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
    /// Item description (only present for array attributes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemsSpec>,
    /// Attribute source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Meta key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    /// DOM selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Nested query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<JsonMap<String, JsonValue>>,
}

/// Item type of an array attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsSpec {
    #[serde(rename = "type")]
    pub item_type: String,
}

impl ItemsSpec {
    /// Items of type `"string"`
    pub fn strings() -> Self {
        Self {
            item_type: DEFAULT_FIELD_TYPE.to_string(),
        }
    }
}

/// Translate a block's fields into its attribute schema.
///
/// A block without a `fields` key yields an empty schema.
pub fn translate(block: &BlockDefinition) -> AttributeSchema {
    block
        .fields()
        .map(|(name, field)| (name.clone(), translate_field(field)))
        .collect()
}

/// Translate a single field into its attribute schema entry
pub fn translate_field(field: &FieldDefinition) -> AttributeSpec {
    let is_array = field.is_array();

    AttributeSpec {
        attr_type: field.resolved_type().to_string(),
        default: if is_array {
            None
        } else {
            field.default_value().cloned()
        },
        items: is_array.then(ItemsSpec::strings),
        source: field.source().map(str::to_string),
        meta: field.meta().map(str::to_string),
        selector: field.selector().map(str::to_string),
        query: field.query().cloned(),
    }
}
