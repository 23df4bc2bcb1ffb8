//! Client-side filtering
//!
//! Filters are recomputed from the full in-memory collection on every
//! change. [`FilterState`] is what the user edits; [`FilterState::predicates`]
//! turns it into a list of [`Predicate`]s for a given resource, and
//! [`apply_filters`] ANDs them together.

use super::registry::ResourceDef;
use crate::entity::Record;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Ephemeral per-view filter state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Case-insensitive substring searched across the resource's search fields
    pub search: String,
    /// Foreign-key field -> selected id
    pub selections: BTreeMap<String, String>,
    /// Selected status option (`active`, `pending`, ...)
    pub status: Option<String>,
    /// Local calendar day matched against the resource's date field
    pub date: Option<NaiveDate>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.selections.is_empty()
            && self.status.is_none()
            && self.date.is_none()
    }

    /// Short description for the list header, e.g. `/shirt status=active`
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.search.trim().is_empty() {
            parts.push(format!("/{}", self.search.trim()));
        }
        for (field, id) in &self.selections {
            parts.push(format!("{}={}", field, id));
        }
        if let Some(status) = &self.status {
            parts.push(format!("status={}", status));
        }
        if let Some(date) = self.date {
            parts.push(format!("date={}", date));
        }
        parts.join(" ")
    }

    /// Predicates for this state, using the fields configured for `def`
    pub fn predicates(&self, def: &ResourceDef) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        let needle = self.search.trim();
        if !needle.is_empty() && !def.search_fields.is_empty() {
            predicates.push(Predicate::Search {
                fields: def.search_fields.clone(),
                needle: needle.to_lowercase(),
            });
        }

        for (field, id) in &self.selections {
            predicates.push(Predicate::Equals {
                field: field.clone(),
                value: id.clone(),
            });
        }

        if let (Some(field), Some(status)) = (&def.status_field, &self.status) {
            predicates.push(Predicate::Status {
                field: field.clone(),
                value: status.to_lowercase(),
            });
        }

        if let (Some(field), Some(day)) = (&def.date_field, self.date) {
            predicates.push(Predicate::SameDay {
                field: field.clone(),
                day,
            });
        }

        predicates
    }
}

/// A single filter predicate over a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Any of `fields` contains `needle` (already lowercased)
    Search { fields: Vec<String>, needle: String },
    /// Exact match on a foreign key
    Equals { field: String, value: String },
    /// Exact match on a status key
    Status { field: String, value: String },
    /// Date field falls on `day` in the local timezone
    SameDay { field: String, day: NaiveDate },
}

impl Predicate {
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        match self {
            Predicate::Search { fields, needle } => fields.iter().any(|f| {
                record
                    .field(f)
                    .search_text()
                    .is_some_and(|text| text.contains(needle.as_str()))
            }),
            Predicate::Equals { field, value } => record.field(field).as_input() == *value,
            Predicate::Status { field, value } => {
                record.field(field).status_key().as_deref() == Some(value.as_str())
            }
            Predicate::SameDay { field, day } => record.field(field).local_day() == Some(*day),
        }
    }
}

/// Records matching every predicate, in their original order
pub fn apply_filters<R: Record>(items: &[R], predicates: &[Predicate]) -> Vec<R> {
    items
        .iter()
        .filter(|item| predicates.iter().all(|p| p.matches(*item)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{OrderEntry, Variant};
    use crate::resource::get_resource;
    use chrono::{Local, TimeZone, Utc};

    fn variant(id: &str, product: &str, name: &str, sku: &str, status: bool) -> Variant {
        Variant {
            id: id.to_string(),
            product_id: product.to_string(),
            name: name.to_string(),
            sku: Some(sku.to_string()),
            price: Some(10.0),
            stock: Some(3),
            status,
            created_at: None,
        }
    }

    fn variants() -> Vec<Variant> {
        vec![
            variant("v1", "p1", "Red / M", "TS-RED-M", true),
            variant("v2", "p1", "Blue / L", "TS-BLU-L", false),
            variant("v3", "p2", "Red / S", "HD-RED-S", true),
        ]
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let def = get_resource("variants").unwrap();
        let state = FilterState {
            search: "RED".to_string(),
            ..Default::default()
        };
        let found = apply_filters(&variants(), &state.predicates(def));
        assert_eq!(found.len(), 2);

        let state = FilterState {
            search: "blu-l".to_string(),
            ..Default::default()
        };
        let found = apply_filters(&variants(), &state.predicates(def));
        assert_eq!(found[0].id, "v2");
    }

    #[test]
    fn test_filters_compose_with_and() {
        let def = get_resource("variants").unwrap();
        let mut state = FilterState {
            search: "red".to_string(),
            status: Some("active".to_string()),
            ..Default::default()
        };
        state.selections.insert("productId".to_string(), "p2".to_string());

        let items = variants();
        let found = apply_filters(&items, &state.predicates(def));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "v3");
        assert_eq!(items.len(), 3, "source must not be mutated");
    }

    #[test]
    fn test_boolean_status_filter() {
        let def = get_resource("variants").unwrap();
        let state = FilterState {
            status: Some("inactive".to_string()),
            ..Default::default()
        };
        let found = apply_filters(&variants(), &state.predicates(def));
        assert_eq!(found.iter().map(|v| v.id.as_str()).collect::<Vec<_>>(), ["v2"]);
    }

    #[test]
    fn test_same_day_uses_local_calendar_day() {
        let def = get_resource("order-history").unwrap();
        let placed = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let order = OrderEntry {
            id: "o1".to_string(),
            order_number: "ORD-1".to_string(),
            customer_name: "Ada".to_string(),
            customer_email: None,
            total: 20.0,
            status: "Pending".to_string(),
            created_at: Some(placed),
        };
        let state = FilterState {
            date: Some(placed.with_timezone(&Local).date_naive()),
            status: Some("pending".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&[order.clone()], &state.predicates(def)).len(), 1);

        let state = FilterState {
            date: NaiveDate::from_ymd_opt(2023, 1, 1),
            ..Default::default()
        };
        assert!(apply_filters(&[order], &state.predicates(def)).is_empty());
    }

    #[test]
    fn test_empty_state_matches_everything() {
        let def = get_resource("variants").unwrap();
        let state = FilterState::default();
        assert!(state.is_empty());
        assert!(state.predicates(def).is_empty());
        assert_eq!(apply_filters(&variants(), &[]).len(), 3);
    }

    #[test]
    fn test_summary() {
        let mut state = FilterState {
            search: " shirt ".to_string(),
            status: Some("active".to_string()),
            ..Default::default()
        };
        state.selections.insert("productId".to_string(), "p1".to_string());
        assert_eq!(state.summary(), "/shirt productId=p1 status=active");
    }
}
