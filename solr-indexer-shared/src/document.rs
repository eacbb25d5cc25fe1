//! Wire-ready documents and boost hints.

use std::collections::BTreeMap;

use serde_json::Value;

/// Field name to wire value mapping, built fresh for every indexing attempt.
pub type Document = BTreeMap<String, Value>;

/// Per-field boost factors. The empty key boosts the whole document.
pub type BoostValues = BTreeMap<String, f64>;

/// Key in `BoostValues` that carries the document-level boost.
pub const DOCUMENT_BOOST_KEY: &str = "";
