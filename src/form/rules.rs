//! Field validation rules

use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, OnceLock};
use thiserror::Error;

/// A single validation rule, as written in the resource definitions
///
/// Unit rules are plain strings (`"required"`), parametrised rules are
/// single-key objects (`{"min_length": 10}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Pattern {
        regex: String,
        #[serde(default)]
        message: Option<String>,
    },
    Number,
    Positive,
    Email,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap_or_else(|e| panic!("bad email regex: {}", e))
    })
}

/// Compiled `pattern` rules, keyed by source; a pattern that fails to
/// compile is cached as `None` and warned about once.
fn compiled_pattern(source: &str) -> Option<Regex> {
    static PATTERNS: OnceLock<Mutex<HashMap<String, Option<Regex>>>> = OnceLock::new();
    let mut patterns = PATTERNS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    patterns
        .entry(source.to_string())
        .or_insert_with(|| match Regex::new(source) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!("Invalid pattern rule {:?}: {}", source, e);
                None
            }
        })
        .clone()
}

impl Rule {
    /// Check `value` against this rule; `label` is used in the message.
    ///
    /// Every rule except `Required` accepts an empty value, so optional
    /// fields only get checked once the user types something.
    pub fn check(&self, label: &str, value: &str) -> Result<(), String> {
        let value = value.trim();

        if value.is_empty() {
            return match self {
                Rule::Required => Err(format!("{} is required", label)),
                _ => Ok(()),
            };
        }

        match self {
            Rule::Required => Ok(()),
            Rule::MinLength(min) => {
                if value.chars().count() < *min {
                    Err(format!("{} must be at least {} characters", label, min))
                } else {
                    Ok(())
                }
            }
            Rule::MaxLength(max) => {
                if value.chars().count() > *max {
                    Err(format!("{} must be at most {} characters", label, max))
                } else {
                    Ok(())
                }
            }
            Rule::Pattern { regex, message } => {
                let matched = compiled_pattern(regex)
                    .map(|re| re.is_match(value))
                    .unwrap_or(false);
                if matched {
                    Ok(())
                } else {
                    Err(message
                        .clone()
                        .unwrap_or_else(|| format!("{} has an invalid format", label)))
                }
            }
            Rule::Number => match value.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(()),
                _ => Err(format!("{} must be a number", label)),
            },
            Rule::Positive => match value.parse::<f64>() {
                Ok(n) if n.is_finite() && n > 0.0 => Ok(()),
                _ => Err(format!("{} must be a positive number", label)),
            },
            Rule::Email => {
                if email_regex().is_match(value) {
                    Ok(())
                } else {
                    Err(format!("{} must be a valid email address", label))
                }
            }
        }
    }
}

/// Per-field validation errors, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn remove(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert_eq!(
            Rule::Required.check("Name", "   "),
            Err("Name is required".to_string())
        );
        assert!(Rule::Required.check("Name", "x").is_ok());
    }

    #[test]
    fn test_min_length_message() {
        let err = Rule::MinLength(10).check("Question", "What size").unwrap_err();
        assert_eq!(err, "Question must be at least 10 characters");
        assert!(Rule::MinLength(10).check("Question", "What sizes?").is_ok());
    }

    #[test]
    fn test_optional_rules_skip_empty_values() {
        assert!(Rule::MinLength(3).check("Sku", "").is_ok());
        assert!(Rule::Positive.check("Price", "").is_ok());
        assert!(Rule::Email.check("Email", "").is_ok());
    }

    #[test]
    fn test_numeric_rules() {
        assert!(Rule::Number.check("Stock", "-3").is_ok());
        assert!(Rule::Number.check("Stock", "three").is_err());
        assert!(Rule::Positive.check("Price", "19.99").is_ok());
        assert!(Rule::Positive.check("Price", "0").is_err());
        assert!(Rule::Positive.check("Price", "NaN").is_err());
    }

    #[test]
    fn test_pattern_with_custom_message() {
        let rule = Rule::Pattern {
            regex: "^[A-Z0-9-]+$".to_string(),
            message: Some("SKU may only contain A-Z, 0-9 and -".to_string()),
        };
        assert!(rule.check("SKU", "TS-RED-M").is_ok());
        assert_eq!(
            rule.check("SKU", "ts red"),
            Err("SKU may only contain A-Z, 0-9 and -".to_string())
        );
    }

    #[test]
    fn test_rule_deserialization() {
        let rules: Vec<Rule> =
            serde_json::from_str(r#"["required", {"min_length": 10}, {"pattern": {"regex": "^a"}}]"#)
                .unwrap();
        assert_eq!(rules[0], Rule::Required);
        assert_eq!(rules[1], Rule::MinLength(10));
        assert!(matches!(rules[2], Rule::Pattern { .. }));
    }

    #[test]
    fn test_field_errors() {
        let mut errors = FieldErrors::new();
        errors.insert("slug", "Slug already exists");
        assert_eq!(errors.get("slug"), Some("Slug already exists"));
        errors.remove("slug");
        assert!(errors.is_empty());
    }
}
