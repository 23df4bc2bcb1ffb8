//! Resource Registry - Load resource definitions from JSON
//!
//! This module loads all shop resource definitions from embedded JSON files
//! and provides lookup functions for the rest of the application.

use crate::form::FormFieldDef;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/common.json"),
    include_str!("../resources/catalog.json"),
    include_str!("../resources/content.json"),
    include_str!("../resources/orders.json"),
];

/// Color definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ColorDef {
    pub value: String,
    pub color: [u8; 3],
}

/// Column definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDef {
    pub header: String,
    /// Record field shown in this column
    pub field: String,
    pub width: u16,
    #[serde(default)]
    pub color_map: Option<String>,
}

/// Sub-resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct SubResourceDef {
    pub resource_key: String,
    pub display_name: String,
    pub shortcut: String,
    /// Query parameter (and record field) the child collection is scoped by
    pub filter_param: String,
    #[serde(default = "default_parent_field")]
    pub parent_field: String,
}

fn default_parent_field() -> String {
    "id".to_string()
}

/// A related collection loaded alongside the primary one to resolve
/// foreign keys into labels
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyDef {
    pub resource_key: String,
    /// Foreign-key field on the primary record
    pub field: String,
    /// Shown when the referenced record is absent
    pub fallback_label: String,
}

fn default_true() -> bool {
    true
}

fn default_id_field() -> String {
    "id".to_string()
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    /// Lowercase singular noun used in messages ("product")
    pub singular: String,
    /// Path segment under `/admin/`
    pub path: String,
    /// Dot path to the item array in list responses; empty for a bare array
    #[serde(default)]
    pub response_path: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    pub label_field: String,
    #[serde(default)]
    pub status_field: Option<String>,
    /// Explicit status options; boolean status fields use active/inactive
    #[serde(default)]
    pub status_values: Vec<String>,
    #[serde(default)]
    pub date_field: Option<String>,
    #[serde(default)]
    pub search_fields: Vec<String>,
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub dependencies: Vec<DependencyDef>,
    #[serde(default)]
    pub sub_resources: Vec<SubResourceDef>,
    #[serde(default)]
    pub form: Vec<FormFieldDef>,
    /// Fields the server enforces uniqueness on; used to attribute 409s
    #[serde(default)]
    pub unique_fields: Vec<String>,
    #[serde(default = "default_true")]
    pub creatable: bool,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default = "default_true")]
    pub deletable: bool,
    /// Send edits as PATCH; set when the form only covers part of the record
    #[serde(default)]
    pub partial_update: bool,
}

impl ResourceDef {
    /// Options offered by the status filter, in cycle order
    pub fn status_options(&self) -> Vec<String> {
        if self.status_field.is_none() {
            return Vec::new();
        }
        if self.status_values.is_empty() {
            vec!["active".to_string(), "inactive".to_string()]
        } else {
            self.status_values.clone()
        }
    }

    /// Dependency resolving the given foreign-key field, if any
    pub fn dependency_for(&self, field: &str) -> Option<&DependencyDef> {
        self.dependencies.iter().find(|d| d.field == field)
    }

    /// Whether toggling flips a boolean status (as opposed to a select)
    pub fn has_boolean_status(&self) -> bool {
        self.status_field.is_some() && self.status_values.is_empty()
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub color_maps: HashMap<String, Vec<ColorDef>>,
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
    /// Fields of the sign-in form
    #[serde(default)]
    pub sign_in: Vec<FormFieldDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            color_maps: HashMap::new(),
            resources: HashMap::new(),
            sign_in: Vec::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.color_maps.extend(partial.color_maps);
            final_config.resources.extend(partial.resources);
            final_config.sign_in.extend(partial.sign_in);
        }

        final_config
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// Get all resource keys, sorted (for autocomplete)
pub fn get_all_resource_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect();
    keys.sort_unstable();
    keys
}

/// Fields of the sign-in form
pub fn sign_in_fields() -> &'static [FormFieldDef] {
    &get_registry().sign_in
}

/// Get a color map by name
pub fn get_color_map(name: &str) -> Option<&'static Vec<ColorDef>> {
    get_registry().color_maps.get(name)
}

/// Get color for a value based on color map name
pub fn get_color_for_value(color_map_name: &str, value: &str) -> Option<[u8; 3]> {
    get_color_map(color_map_name)?
        .iter()
        .find(|c| c.value.eq_ignore_ascii_case(value))
        .map(|c| c.color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::*;
    use crate::form::Rule;

    fn assert_fields_known<R: Record>() {
        let def = get_resource(R::KEY).unwrap();
        let mut names: Vec<&str> = vec![def.label_field.as_str(), def.id_field.as_str()];
        names.extend(def.status_field.as_deref());
        names.extend(def.date_field.as_deref());
        names.extend(def.search_fields.iter().map(String::as_str));
        names.extend(def.columns.iter().map(|c| c.field.as_str()));
        names.extend(def.dependencies.iter().map(|d| d.field.as_str()));
        names.extend(def.form.iter().map(|f| f.name.as_str()));
        names.extend(def.unique_fields.iter().map(String::as_str));
        for name in names {
            assert!(
                R::FIELDS.contains(&name),
                "{} references unknown field {}",
                R::KEY,
                name
            );
        }
    }

    #[test]
    fn test_registry_loads_successfully() {
        let registry = get_registry();
        assert!(
            !registry.resources.is_empty(),
            "Registry should have resources"
        );
        assert_eq!(registry.sign_in.len(), 2);
    }

    #[test]
    fn test_products_resource_exists() {
        let resource = get_resource("products").expect("products should exist");
        assert_eq!(resource.display_name, "Products");
        assert_eq!(resource.path, "products");
        assert_eq!(resource.sub_resources.len(), 4);
        assert_eq!(resource.sub_resources[0].parent_field, "id");
    }

    #[test]
    fn test_get_all_resource_keys() {
        let keys = get_all_resource_keys();
        assert_eq!(keys.len(), RESOURCE_KEYS.len());
        assert!(keys.contains(&"order-history"));
    }

    #[test]
    fn test_definitions_reference_record_fields() {
        assert_fields_known::<Product>();
        assert_fields_known::<Variant>();
        assert_fields_known::<Tag>();
        assert_fields_known::<Faq>();
        assert_fields_known::<PriceRow>();
        assert_fields_known::<SeoMeta>();
        assert_fields_known::<GalleryImage>();
        assert_fields_known::<OrderEntry>();
        assert_fields_known::<ReturnRequest>();
        assert_fields_known::<Replacement>();
    }

    #[test]
    fn test_dependencies_point_at_registered_resources() {
        for key in get_all_resource_keys() {
            let def = get_resource(key).unwrap();
            for dep in &def.dependencies {
                assert!(get_resource(&dep.resource_key).is_some(), "{}", dep.resource_key);
            }
            for sub in &def.sub_resources {
                assert!(get_resource(&sub.resource_key).is_some(), "{}", sub.resource_key);
            }
        }
    }

    #[test]
    fn test_status_options() {
        assert_eq!(
            get_resource("tags").unwrap().status_options(),
            vec!["active", "inactive"]
        );
        assert!(get_resource("pricing").unwrap().status_options().is_empty());
        assert_eq!(get_resource("order-history").unwrap().status_options()[0], "pending");
    }

    #[test]
    fn test_pattern_rules_compile() {
        let registry = get_registry();
        let fields = registry
            .resources
            .values()
            .flat_map(|def| def.form.iter())
            .chain(registry.sign_in.iter());
        for field in fields {
            for rule in &field.rules {
                if let Rule::Pattern { regex, .. } = rule {
                    assert!(
                        regex::Regex::new(regex).is_ok(),
                        "{} has an invalid pattern {:?}",
                        field.name,
                        regex
                    );
                }
            }
        }
    }

    #[test]
    fn test_partial_update_resources() {
        assert!(get_resource("order-history").unwrap().partial_update);
        assert!(!get_resource("products").unwrap().partial_update);
    }

    #[test]
    fn test_color_lookup_is_case_insensitive() {
        assert_eq!(
            get_color_for_value("order_status", "Delivered"),
            Some([80, 200, 120])
        );
        assert!(get_color_for_value("status", "unknown").is_none());
    }
}
