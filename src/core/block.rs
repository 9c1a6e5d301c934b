//! Block and field definitions
//!
//! This module defines the declarative shapes loaded from block sources: a
//! [`BlockDefinition`] owns an ordered map of [`FieldDefinition`]s, and a
//! [`BlockMap`] maps block keys to their definitions. Keys this crate does not
//! interpret (titles, icons, labels, help text) are preserved verbatim so the
//! serialized map handed to the editor loses nothing.

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Ordered mapping of field name to field definition
pub type FieldMap = IndexMap<String, FieldDefinition>;

/// Ordered mapping of block key to block definition
pub type BlockMap = IndexMap<String, BlockDefinition>;

/// Attribute values supplied for a single render
pub type Attributes = IndexMap<String, JsonValue>;

/// Type given to fields that declare none
pub const DEFAULT_FIELD_TYPE: &str = "string";

/// Field type that never carries a schema-level default
pub const ARRAY_FIELD_TYPE: &str = "array";

/// A single field of a block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name as declared in the source
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Declared attribute type (`"string"`, `"array"`, `"boolean"`, ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Default value; a JSON `null` is kept for the editor but is not a default
    #[serde(
        default,
        deserialize_with = "keep_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<JsonValue>,
    /// Editor control kind, e.g. `"text"` or `"user"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<String>,
    /// Attribute source (`"attribute"`, `"html"`, `"meta"`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Meta key for meta-sourced attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    /// DOM selector for markup-sourced attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Nested query for query-sourced attributes
    #[serde(
        default,
        deserialize_with = "map_or_empty_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub query: Option<JsonMap<String, JsonValue>>,
    /// Keys passed through untouched
    #[serde(flatten)]
    pub extra: IndexMap<String, JsonValue>,
}

impl FieldDefinition {
    /// Create a field with the given name and no other settings
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the declared type
    pub fn with_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    /// Set the default value
    pub fn with_default(mut self, default: impl Into<JsonValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the editor control kind
    pub fn with_control(mut self, control: impl Into<String>) -> Self {
        self.control = Some(control.into());
        self
    }

    /// Set the attribute source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the meta key
    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    /// Set the selector
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Set the query
    pub fn with_query(mut self, query: JsonMap<String, JsonValue>) -> Self {
        self.query = Some(query);
        self
    }

    /// The effective type: the declared type, or `"string"` when absent or empty
    pub fn resolved_type(&self) -> &str {
        non_empty(self.field_type.as_deref()).unwrap_or(DEFAULT_FIELD_TYPE)
    }

    /// Whether the effective type is `"array"`
    pub fn is_array(&self) -> bool {
        self.resolved_type() == ARRAY_FIELD_TYPE
    }

    /// The declared default, if any.
    ///
    /// `false`, `0` and `""` are real defaults; only an absent key or `null`
    /// means "no default".
    pub fn default_value(&self) -> Option<&JsonValue> {
        self.default.as_ref().filter(|value| !value.is_null())
    }

    /// The editor control kind, if declared and non-empty
    pub fn control(&self) -> Option<&str> {
        non_empty(self.control.as_deref())
    }

    /// The attribute source, if declared and non-empty
    pub fn source(&self) -> Option<&str> {
        non_empty(self.source.as_deref())
    }

    /// The meta key, if declared and non-empty
    pub fn meta(&self) -> Option<&str> {
        non_empty(self.meta.as_deref())
    }

    /// The selector, if declared and non-empty
    pub fn selector(&self) -> Option<&str> {
        non_empty(self.selector.as_deref())
    }

    /// The query, if declared with at least one entry
    pub fn query(&self) -> Option<&JsonMap<String, JsonValue>> {
        self.query.as_ref().filter(|query| !query.is_empty())
    }
}

/// A block: a display name used as the template slug, plus its fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    /// Block name; templates are looked up by this slug
    pub name: String,
    /// Field definitions in declaration order
    #[serde(
        default,
        deserialize_with = "map_or_empty_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub fields: Option<FieldMap>,
    /// Keys passed through untouched (title, category, icon, keywords, ...)
    #[serde(flatten)]
    pub extra: IndexMap<String, JsonValue>,
}

impl BlockDefinition {
    /// Create a block with the given name and no `fields` key
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: None,
            extra: IndexMap::new(),
        }
    }

    /// Add a field, creating the field map if needed
    pub fn with_field(mut self, key: impl Into<String>, field: FieldDefinition) -> Self {
        self.fields
            .get_or_insert_with(FieldMap::new)
            .insert(key.into(), field);
        self
    }

    /// Add a pass-through key
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Iterate over the fields in declaration order; empty when the block has no `fields` key
    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldDefinition)> {
        self.fields.iter().flatten()
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.as_ref().and_then(|fields| fields.get(name))
    }

    /// Number of declared fields
    pub fn field_count(&self) -> usize {
        self.fields.as_ref().map_or(0, |fields| fields.len())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// A present key is `Some`, even when its value is `null`
fn keep_null<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}

/// Accept an object, `null`, or `[]`.
///
/// Stores that encode an empty map as an empty list write `[]` where an
/// object is expected.
fn map_or_empty_list<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MapOrList<T> {
        Map(T),
        List(Vec<JsonValue>),
    }

    match Option::<MapOrList<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(MapOrList::Map(map)) => Ok(Some(map)),
        Some(MapOrList::List(list)) if list.is_empty() => Ok(Some(T::default())),
        Some(MapOrList::List(_)) => Err(de::Error::custom(
            "expected an object or an empty array",
        )),
    }
}
