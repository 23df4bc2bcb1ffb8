//! Form Draft
//!
//! The working copy of a record while it is being created or edited.

use super::rules::FieldErrors;
use super::slug::slugify;
use super::{FieldKind, FormFieldDef};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, HashSet};

/// Editable form state: raw text inputs, per-field errors and the set of
/// slug fields the user has taken over by hand.
#[derive(Debug, Clone)]
pub struct FormDraft {
    fields: Vec<FormFieldDef>,
    values: BTreeMap<String, String>,
    errors: FieldErrors,
    overridden: HashSet<String>,
}

impl FormDraft {
    /// Empty template for a new record (field defaults applied)
    pub fn new(fields: Vec<FormFieldDef>) -> Self {
        let values = fields
            .iter()
            .map(|f| {
                let initial = f.default.clone().unwrap_or_else(|| match f.kind {
                    FieldKind::Bool => "true".to_string(),
                    _ => String::new(),
                });
                (f.name.clone(), initial)
            })
            .collect();

        Self {
            fields,
            values,
            errors: FieldErrors::new(),
            overridden: HashSet::new(),
        }
    }

    /// Draft pre-filled from an existing record.
    ///
    /// A slug that differs from what its source would derive counts as a
    /// manual override, so editing the source keeps the stored slug.
    pub fn prefilled(fields: Vec<FormFieldDef>, value_of: impl Fn(&str) -> String) -> Self {
        let mut draft = Self::new(fields);
        let names: Vec<String> = draft.fields.iter().map(|f| f.name.clone()).collect();
        for name in names {
            draft.values.insert(name.clone(), value_of(&name));
        }

        let overridden: Vec<String> = draft
            .fields
            .iter()
            .filter(|f| f.kind == FieldKind::Slug)
            .filter(|f| {
                let current = draft.value(&f.name);
                let derived = f
                    .source
                    .as_deref()
                    .map(|src| slugify(draft.value(src)))
                    .unwrap_or_default();
                !current.is_empty() && current != derived
            })
            .map(|f| f.name.clone())
            .collect();
        draft.overridden.extend(overridden);

        draft
    }

    pub fn fields(&self) -> &[FormFieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FormFieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// Set a field from user input.
    ///
    /// Clears the field's error and recomputes every slug derived from it
    /// that has not been overridden. Typing into a slug marks it overridden;
    /// emptying it hands it back to derivation.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        self.errors.remove(name);

        let slug_source = self
            .field(name)
            .filter(|f| f.kind == FieldKind::Slug)
            .map(|f| f.source.clone());

        if let Some(source) = slug_source {
            if value.is_empty() {
                self.overridden.remove(name);
                let derived = source
                    .as_deref()
                    .map(|src| slugify(self.value(src)))
                    .unwrap_or_default();
                self.values.insert(name.to_string(), derived);
            } else {
                self.overridden.insert(name.to_string());
                self.values.insert(name.to_string(), value);
            }
            return;
        }

        self.values.insert(name.to_string(), value);
        self.rederive(name);
    }

    /// Set a value without touching errors or overrides (scope pre-fill)
    pub fn preset(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
        self.rederive(name);
    }

    fn rederive(&mut self, source: &str) {
        let source_value = slugify(self.value(source));
        let targets: Vec<String> = self
            .fields
            .iter()
            .filter(|f| f.kind == FieldKind::Slug && f.source.as_deref() == Some(source))
            .filter(|f| !self.overridden.contains(&f.name))
            .map(|f| f.name.clone())
            .collect();

        for target in targets {
            self.errors.remove(&target);
            self.values.insert(target, source_value.clone());
        }
    }

    pub fn is_overridden(&self, name: &str) -> bool {
        self.overridden.contains(name)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name)
    }

    /// Attach an error to a field (e.g. a conflict reported by the server)
    pub fn set_error(&mut self, name: &str, message: impl Into<String>) {
        self.errors.insert(name, message);
    }

    /// Run every field's rules; returns true when the draft may be submitted
    pub fn validate(&mut self) -> bool {
        self.errors.clear();
        for field in &self.fields {
            let value = self.values.get(&field.name).map(String::as_str).unwrap_or("");
            if let Err(message) = field.check(value) {
                self.errors.insert(&field.name, message);
            }
        }
        self.errors.is_empty()
    }

    /// JSON body for the API; inputs are converted according to field kind
    /// and empty optional inputs are sent as `null`.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();

        for field in &self.fields {
            let raw = self.value(&field.name).trim();
            let value = if raw.is_empty() {
                Value::Null
            } else {
                match field.kind {
                    FieldKind::Number => raw
                        .parse::<f64>()
                        .ok()
                        .and_then(Number::from_f64)
                        .map(Value::Number)
                        .unwrap_or(Value::Null),
                    FieldKind::Integer => raw
                        .parse::<i64>()
                        .map(|n| Value::Number(n.into()))
                        .unwrap_or(Value::Null),
                    FieldKind::Bool => Value::Bool(raw == "true"),
                    _ => Value::String(raw.to_string()),
                }
            };
            body.insert(field.name.clone(), value);
        }

        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Rule;
    use serde_json::json;

    fn text(name: &str, rules: Vec<Rule>) -> FormFieldDef {
        FormFieldDef {
            name: name.to_string(),
            label: name.to_string(),
            kind: FieldKind::Text,
            source: None,
            options: Vec::new(),
            default: None,
            rules,
        }
    }

    fn slug_of(source: &str) -> FormFieldDef {
        FormFieldDef {
            kind: FieldKind::Slug,
            source: Some(source.to_string()),
            ..text("slug", vec![Rule::Required])
        }
    }

    fn tag_fields() -> Vec<FormFieldDef> {
        vec![text("name", vec![Rule::Required]), slug_of("name")]
    }

    #[test]
    fn test_slug_follows_source() {
        let mut draft = FormDraft::new(tag_fields());
        draft.set("name", "New Arrival!! 2024");
        assert_eq!(draft.value("slug"), "new-arrival-2024");
        draft.set("name", "New Arrival");
        assert_eq!(draft.value("slug"), "new-arrival");
    }

    #[test]
    fn test_manual_slug_is_kept() {
        let mut draft = FormDraft::new(tag_fields());
        draft.set("name", "Summer");
        draft.set("slug", "hot-deals");
        draft.set("name", "Summer Sale");
        assert_eq!(draft.value("slug"), "hot-deals");
        assert!(draft.is_overridden("slug"));

        draft.set("slug", "");
        assert_eq!(draft.value("slug"), "summer-sale");
        assert!(!draft.is_overridden("slug"));
    }

    #[test]
    fn test_prefilled_custom_slug_counts_as_override() {
        let draft = FormDraft::prefilled(tag_fields(), |name| match name {
            "name" => "Winter".to_string(),
            "slug" => "cold-stuff".to_string(),
            _ => String::new(),
        });
        assert!(draft.is_overridden("slug"));

        let draft = FormDraft::prefilled(tag_fields(), |name| match name {
            "name" => "Winter".to_string(),
            "slug" => "winter".to_string(),
            _ => String::new(),
        });
        assert!(!draft.is_overridden("slug"));
    }

    #[test]
    fn test_validate_and_clear_on_edit() {
        let fields = vec![text("question", vec![Rule::Required, Rule::MinLength(10)])];
        let mut draft = FormDraft::new(fields);
        draft.set("question", "123456789");
        assert!(!draft.validate());
        assert_eq!(
            draft.error("question"),
            Some("question must be at least 10 characters")
        );

        draft.set("question", "1234567890");
        assert_eq!(draft.error("question"), None);
        assert!(draft.validate());
    }

    #[test]
    fn test_body_conversion() {
        let fields = vec![
            text("name", vec![]),
            FormFieldDef {
                kind: FieldKind::Number,
                ..text("price", vec![])
            },
            FormFieldDef {
                kind: FieldKind::Integer,
                ..text("stock", vec![])
            },
            FormFieldDef {
                kind: FieldKind::Bool,
                ..text("status", vec![])
            },
            text("sku", vec![]),
        ];
        let mut draft = FormDraft::new(fields);
        draft.set("name", " Red Tee ");
        draft.set("price", "19.5");
        draft.set("stock", "7");
        draft.set("status", "false");

        assert_eq!(
            draft.to_body(),
            json!({
                "name": "Red Tee",
                "price": 19.5,
                "stock": 7,
                "status": false,
                "sku": null
            })
        );
    }

    #[test]
    fn test_integer_field_rejects_fractions() {
        let mut draft = FormDraft::new(vec![FormFieldDef {
            kind: FieldKind::Integer,
            label: "Quantity".to_string(),
            ..text("quantity", vec![Rule::Required, Rule::Positive])
        }]);
        draft.set("quantity", "2.5");
        assert!(!draft.validate());
        assert_eq!(draft.error("quantity"), Some("Quantity must be a whole number"));

        draft.set("quantity", "3");
        assert!(draft.validate());
        assert_eq!(draft.to_body(), json!({ "quantity": 3 }));
    }

    #[test]
    fn test_bool_defaults_to_true() {
        let draft = FormDraft::new(vec![FormFieldDef {
            kind: FieldKind::Bool,
            ..text("active", vec![])
        }]);
        assert_eq!(draft.value("active"), "true");
    }
}
