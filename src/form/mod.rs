//! Forms
//!
//! Form field definitions (declared per resource in the embedded JSON),
//! the editable [`FormDraft`] and its validation rules.
//!
//! - [`rules`] - Named validation rules and [`FieldErrors`]
//! - [`draft`] - Working copy of a record being created or edited
//! - [`slug`] - Slug derivation for auto-derived fields

pub mod draft;
pub mod rules;
pub mod slug;

pub use draft::FormDraft;
pub use rules::{FieldErrors, Rule};
pub use slug::slugify;

use serde::Deserialize;

/// Input kind of a form field; decides how the raw input is sent to the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    Number,
    Integer,
    Bool,
    /// Foreign key into a dependency collection
    Reference,
    /// Derived from `source` until edited by hand
    Slug,
    /// One of `options`
    Select,
    /// Masked on screen
    Password,
}

/// Form field definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct FormFieldDef {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    /// Source field for slug derivation
    #[serde(default)]
    pub source: Option<String>,
    /// Allowed values for `select` fields
    #[serde(default)]
    pub options: Vec<String>,
    /// Initial value for new records
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl FormFieldDef {
    pub fn is_required(&self) -> bool {
        self.rules.contains(&Rule::Required)
    }

    /// Run the rules in order and return the first failure
    pub fn check(&self, value: &str) -> Result<(), String> {
        if self.kind == FieldKind::Select && !value.is_empty() && !self.options.iter().any(|o| o == value) {
            return Err(format!("{} must be one of: {}", self.label, self.options.join(", ")));
        }
        if self.kind == FieldKind::Integer && !value.trim().is_empty() && value.trim().parse::<i64>().is_err() {
            return Err(format!("{} must be a whole number", self.label));
        }
        for rule in &self.rules {
            rule.check(&self.label, value)?;
        }
        Ok(())
    }
}
