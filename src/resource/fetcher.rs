//! Resource Fetcher
//!
//! Fetches collections from the admin API based on resource definitions,
//! and builds id -> label lookups for dependency collections.

use super::registry::ResourceDef;
use crate::api::{ApiClient, ApiError};
use crate::entity::Record;
use serde_json::Value;
use std::collections::HashMap;

/// Fetch a full collection and decode it into typed records.
///
/// An empty or absent body yields an empty collection. Items that do not
/// decode are skipped with a warning.
pub async fn fetch_collection<R: Record>(
    client: &ApiClient,
    def: &ResourceDef,
    params: &[(String, String)],
) -> Result<Vec<R>, ApiError> {
    let response = client.get(&def.path, params).await?;
    let raw_items = extract_items(&response, &def.response_path);

    let total = raw_items.len();
    let items: Vec<R> = raw_items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<R>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping undecodable {} item: {}", def.singular, e);
                None
            }
        })
        .collect();

    tracing::debug!("Fetched {}/{} {}", items.len(), total, def.path);
    Ok(items)
}

/// Fetch a dependency collection as an id -> label lookup
pub async fn fetch_lookup(
    client: &ApiClient,
    def: &ResourceDef,
    fallback: &str,
) -> Result<Lookup, ApiError> {
    let response = client.get(&def.path, &[]).await?;
    let items = extract_items(&response, &def.response_path);
    Ok(Lookup::from_items(&items, def, fallback))
}

/// Extract items from response using the response_path
pub fn extract_items(response: &Value, path: &str) -> Vec<Value> {
    if response.is_null() {
        return vec![];
    }
    if path.is_empty() {
        return response.as_array().cloned().unwrap_or_default();
    }

    let mut current = response;
    for part in path.split('.') {
        current = match current.get(part) {
            Some(v) => v,
            // Some endpoints answer with a bare array regardless of envelope
            None => return response.as_array().cloned().unwrap_or_default(),
        };
    }

    current.as_array().cloned().unwrap_or_default()
}

/// Labels of a dependency collection, keyed by id
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    labels: HashMap<String, String>,
    /// (id, label) in server order, for pickers
    options: Vec<(String, String)>,
    fallback: String,
}

impl Lookup {
    pub fn from_items(items: &[Value], def: &ResourceDef, fallback: &str) -> Self {
        let mut lookup = Self {
            fallback: fallback.to_string(),
            ..Default::default()
        };

        for item in items {
            let id = extract_json_value(item, &def.id_field);
            let id = if id == "-" {
                extract_json_value(item, "_id")
            } else {
                id
            };
            if id == "-" {
                continue;
            }
            let label = extract_json_value(item, &def.label_field);
            let label = if label == "-" { id.clone() } else { label };

            lookup.labels.insert(id.clone(), label.clone());
            lookup.options.push((id, label));
        }

        lookup
    }

    /// Label for `id`, or the fallback label when it is unknown
    pub fn resolve(&self, id: &str) -> &str {
        self.labels
            .get(id)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Extract a value from JSON using a dot-notation path
pub fn extract_json_value(item: &Value, path: &str) -> String {
    let mut current = item;

    for part in path.split('.') {
        // Handle array index
        let next = match part.parse::<usize>() {
            Ok(idx) => current.get(idx),
            Err(_) => current.get(part),
        };
        current = match next {
            Some(v) => v,
            None => return "-".to_string(),
        };
    }

    match current {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(_) => "[object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::get_resource;
    use serde_json::json;

    #[test]
    fn test_extract_items_paths() {
        let wrapped = json!({"data": [{"id": 1}, {"id": 2}]});
        assert_eq!(extract_items(&wrapped, "data").len(), 2);

        let bare = json!([{"id": 1}]);
        assert_eq!(extract_items(&bare, "").len(), 1);
        assert_eq!(extract_items(&bare, "data").len(), 1);

        let nested = json!({"data": {"orders": [{"id": 1}]}});
        assert_eq!(extract_items(&nested, "data.orders").len(), 1);

        assert!(extract_items(&Value::Null, "data").is_empty());
        assert!(extract_items(&json!({"data": null}), "data").is_empty());
        assert!(extract_items(&json!({"message": "ok"}), "data").is_empty());
    }

    #[test]
    fn test_lookup_resolves_with_fallback() {
        let def = get_resource("products").unwrap();
        let items = vec![
            json!({"_id": "p1", "title": "Blue Shirt"}),
            json!({"id": "p2", "title": "Hoodie"}),
            json!({"title": "No id"}),
        ];
        let lookup = Lookup::from_items(&items, def, "Unknown Product");
        assert_eq!(lookup.resolve("p1"), "Blue Shirt");
        assert_eq!(lookup.resolve("p2"), "Hoodie");
        assert_eq!(lookup.resolve("p9"), "Unknown Product");
        assert_eq!(lookup.options().len(), 2);
    }

    #[test]
    fn test_extract_json_value() {
        let item = json!({"a": {"b": [10, {"c": true}]}, "n": null});
        assert_eq!(extract_json_value(&item, "a.b.0"), "10");
        assert_eq!(extract_json_value(&item, "a.b.1.c"), "true");
        assert_eq!(extract_json_value(&item, "a.b"), "[2 items]");
        assert_eq!(extract_json_value(&item, "n"), "-");
        assert_eq!(extract_json_value(&item, "missing"), "-");
    }
}
