//! Solr-specific adjustments applied to a document before submission.

use serde_json::Value;

use solr_indexer_shared::Document;

const ALLOWED_ROLES_AND_USERS: &str = "allowedRolesAndUsers";
const LANGUAGE: &str = "Language";

/// Adjust field values for Solr.
///
/// `:` is reserved in Solr queries, so role and user tokens in
/// `allowedRolesAndUsers` use `$` instead. An empty `Language` means
/// language-neutral content and is stored as `any`.
pub fn prepare_data(document: &mut Document) {
    if let Some(allowed) = document.get_mut(ALLOWED_ROLES_AND_USERS) {
        match allowed {
            Value::Array(items) => {
                for item in items.iter_mut() {
                    if let Value::String(token) = item {
                        *token = token.replace(':', "$");
                    }
                }
            }
            Value::String(token) => *token = token.replace(':', "$"),
            _ => {}
        }
    }

    if let Some(Value::String(language)) = document.get_mut(LANGUAGE) {
        if language.is_empty() {
            *language = "any".to_string();
        }
    }
}
