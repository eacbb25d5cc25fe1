//! Parsing of the Solr schema API response.
//!
//! The schema is read from `GET <solrBase>/schema?wt=json`. Field types are
//! resolved so every field carries the implementation class of its type.

use std::collections::HashMap;

use serde::Deserialize;

use crate::errors::SolrError;
use solr_indexer_shared::{FieldSpec, Schema, DEFAULT_SEPARATOR};

/// Path of the schema endpoint below the Solr base.
pub const SCHEMA_PATH: &str = "/schema?wt=json";

#[derive(Debug, Deserialize)]
struct SchemaResponse {
    schema: RawSchema,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchema {
    unique_key: Option<String>,
    #[serde(default)]
    fields: Vec<RawField>,
    #[serde(default)]
    field_types: Vec<RawFieldType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    multi_valued: Option<bool>,
    #[serde(default)]
    required: bool,
    separator: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFieldType {
    name: String,
    class: String,
    multi_valued: Option<bool>,
}

/// Parse a schema API response body.
pub fn parse_schema(body: &str) -> Result<Schema, SolrError> {
    let response: SchemaResponse = serde_json::from_str(body)?;
    let raw = response.schema;

    let types: HashMap<&str, &RawFieldType> = raw
        .field_types
        .iter()
        .map(|t| (t.name.as_str(), t))
        .collect();

    let mut schema = Schema::new(raw.unique_key.clone());
    for field in &raw.fields {
        let field_type = types.get(field.field_type.as_str());
        let class = field_type.map(|t| t.class.clone()).unwrap_or_default();
        let multi_valued = field
            .multi_valued
            .or_else(|| field_type.and_then(|t| t.multi_valued))
            .unwrap_or(false);

        schema.insert(FieldSpec {
            name: field.name.clone(),
            field_type: field.field_type.clone(),
            class,
            multi_valued,
            required: field.required,
            separator: field
                .separator
                .clone()
                .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string()),
        });
    }

    if let Some(key) = &schema.unique_key {
        if !schema.contains(key) {
            return Err(SolrError::parse(format!(
                "unique key {} is not a declared field",
                key
            )));
        }
    }

    Ok(schema)
}
