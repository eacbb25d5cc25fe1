//! Index schema snapshot.
//!
//! A `Schema` is fetched from the search engine, cached by the connection
//! manager and treated as read-only for the duration of one operation.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Separator used to join sequence values for single-valued fields.
pub const DEFAULT_SEPARATOR: &str = " ";

/// Coarse classification of a field type, derived from its type class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Date,
    Int,
    Text,
    Other,
}

impl FieldKind {
    /// Classify a Solr field type class name such as `solr.TrieDateField`.
    pub fn from_class(class: &str) -> Self {
        match class {
            "solr.DateField" | "solr.TrieDateField" | "solr.DatePointField" => Self::Date,
            "solr.IntField" | "solr.TrieIntField" | "solr.IntPointField" => Self::Int,
            "solr.TextField" | "solr.StrField" => Self::Text,
            _ => Self::Other,
        }
    }
}

/// Definition of a single schema field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Name of the declared field type (e.g. `date`, `string`).
    pub field_type: String,
    /// Implementation class of the field type (e.g. `solr.TrieDateField`).
    pub class: String,
    /// Whether the field accepts multiple values.
    pub multi_valued: bool,
    /// Whether the field must be present for a document to be accepted.
    pub required: bool,
    /// Separator used when joining sequence values into a single value.
    pub separator: String,
}

impl FieldSpec {
    /// Create a single-valued, optional field spec.
    pub fn new(name: impl Into<String>, field_type: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            class: class.into(),
            multi_valued: false,
            required: false,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Mark the field as multi-valued.
    pub fn multi_valued(mut self) -> Self {
        self.multi_valued = true;
        self
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Override the join separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn kind(&self) -> FieldKind {
        FieldKind::from_class(&self.class)
    }
}

/// Snapshot of the remote index's field definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Field definitions keyed by field name.
    pub fields: BTreeMap<String, FieldSpec>,
    /// Name of the unique key field, if the schema declares one.
    pub unique_key: Option<String>,
    /// Names of the fields every document must carry.
    pub required_fields: BTreeSet<String>,
}

impl Schema {
    /// Create an empty schema with the given unique key.
    pub fn new(unique_key: Option<String>) -> Self {
        Self {
            fields: BTreeMap::new(),
            unique_key,
            required_fields: BTreeSet::new(),
        }
    }

    /// Add a field, registering it as required when flagged.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.insert(field);
        self
    }

    pub fn insert(&mut self, field: FieldSpec) {
        if field.required {
            self.required_fields.insert(field.name.clone());
        }
        self.fields.insert(field.name.clone(), field);
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over all field names in the schema.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Keep only the given attribute names that are also schema fields.
    pub fn relevant<'a, I>(&self, attributes: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        attributes
            .into_iter()
            .filter(|name| self.contains(name))
            .map(str::to_string)
            .collect()
    }
}
