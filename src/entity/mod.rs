//! Typed entity records
//!
//! Every managed collection has an explicit record type. Records expose
//! their fields by (JSON) name through [`Record::field`], which is what the
//! generic filters, table columns and forms address; the per-entity JSON
//! definitions may only reference names listed in [`Record::FIELDS`].
//!
//! - [`catalog`] - Products, variants, tags, pricing, SEO and gallery
//! - [`content`] - FAQs
//! - [`orders`] - Order history, returns and replacements

pub mod catalog;
pub mod content;
pub mod orders;

pub use catalog::{GalleryImage, PriceRow, Product, SeoMeta, Tag, Variant};
pub use content::Faq;
pub use orders::{OrderEntry, Replacement, ReturnRequest};

use crate::api::client::ApiClient;
use crate::notification::Notifier;
use crate::resource::{ManagerSettings, ResourceManager, ResourceView};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// A typed record managed through a [`ResourceManager`]
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Registry key of the resource definition for this record
    const KEY: &'static str;
    /// Field names addressable through [`Record::field`]
    const FIELDS: &'static [&'static str];

    /// Server-assigned identifier
    fn id(&self) -> &str;

    /// Value of a named field; unknown names yield [`FieldValue::Missing`]
    fn field(&self, name: &str) -> FieldValue;
}

/// A single field value, as seen by filters, columns and forms
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(DateTime<Utc>),
    Missing,
}

impl FieldValue {
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    pub fn opt_text(s: Option<&String>) -> Self {
        s.map_or(Self::Missing, |s| Self::Text(s.clone()))
    }

    pub fn opt_number(n: Option<f64>) -> Self {
        n.map_or(Self::Missing, Self::Number)
    }

    pub fn opt_int(n: Option<i64>) -> Self {
        n.map_or(Self::Missing, |n| Self::Number(n as f64))
    }

    pub fn opt_date(d: Option<DateTime<Utc>>) -> Self {
        d.map_or(Self::Missing, Self::Date)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Table display ("-" for missing values)
    pub fn display(&self) -> String {
        match self {
            Self::Missing => "-".to_string(),
            Self::Date(d) => d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
            Self::Bool(b) => (if *b { "active" } else { "inactive" }).to_string(),
            other => other.as_input(),
        }
    }

    /// Raw form input for this value ("" for missing values)
    pub fn as_input(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Date(d) => d.to_rfc3339(),
            Self::Missing => String::new(),
        }
    }

    /// Lowercased text used by substring search; `None` when missing
    pub fn search_text(&self) -> Option<String> {
        match self {
            Self::Missing => None,
            Self::Bool(_) => None,
            Self::Date(_) => Some(self.display().to_lowercase()),
            other => Some(other.as_input().to_lowercase()),
        }
    }

    /// Key compared by the status filter: booleans map to
    /// `active`/`inactive`, text is lowercased
    pub fn status_key(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some((if *b { "active" } else { "inactive" }).to_string()),
            Self::Text(s) => Some(s.to_lowercase()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Calendar day in the local timezone.
    ///
    /// Text values are accepted in RFC 3339 or `YYYY-MM-DD` form.
    pub fn local_day(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(d.with_timezone(&Local).date_naive()),
            Self::Text(s) => DateTime::parse_from_rfc3339(s)
                .map(|d| d.with_timezone(&Local).date_naive())
                .ok()
                .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
            _ => None,
        }
    }
}

/// Shared collaborators for opening list views
#[derive(Clone)]
pub struct ViewContext {
    pub client: ApiClient,
    pub notifier: Arc<dyn Notifier>,
    pub settings: ManagerSettings,
}

/// Keys of every resource that can be opened as a list view
pub const RESOURCE_KEYS: &[&str] = &[
    Product::KEY,
    Variant::KEY,
    Tag::KEY,
    Faq::KEY,
    PriceRow::KEY,
    SeoMeta::KEY,
    GalleryImage::KEY,
    OrderEntry::KEY,
    ReturnRequest::KEY,
    Replacement::KEY,
];

/// Open the list view for `key`, optionally scoped to a parent
/// (`scope` is a query parameter name and value, e.g. `productId`).
pub fn open_view(
    key: &str,
    ctx: &ViewContext,
    scope: Option<(String, String)>,
) -> Option<Box<dyn ResourceView>> {
    match key {
        k if k == Product::KEY => boxed::<Product>(ctx, scope),
        k if k == Variant::KEY => boxed::<Variant>(ctx, scope),
        k if k == Tag::KEY => boxed::<Tag>(ctx, scope),
        k if k == Faq::KEY => boxed::<Faq>(ctx, scope),
        k if k == PriceRow::KEY => boxed::<PriceRow>(ctx, scope),
        k if k == SeoMeta::KEY => boxed::<SeoMeta>(ctx, scope),
        k if k == GalleryImage::KEY => boxed::<GalleryImage>(ctx, scope),
        k if k == OrderEntry::KEY => boxed::<OrderEntry>(ctx, scope),
        k if k == ReturnRequest::KEY => boxed::<ReturnRequest>(ctx, scope),
        k if k == Replacement::KEY => boxed::<Replacement>(ctx, scope),
        _ => None,
    }
}

fn boxed<R: Record>(
    ctx: &ViewContext,
    scope: Option<(String, String)>,
) -> Option<Box<dyn ResourceView>> {
    let mut manager =
        ResourceManager::<R>::new(ctx.client.clone(), ctx.notifier.clone(), ctx.settings)?;
    if let Some((param, value)) = scope {
        manager = manager.with_scope(&param, &value);
    }
    Some(Box::new(manager))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_and_input() {
        assert_eq!(FieldValue::Number(12.0).display(), "12");
        assert_eq!(FieldValue::Number(12.5).as_input(), "12.5");
        assert_eq!(FieldValue::Bool(false).display(), "inactive");
        assert_eq!(FieldValue::Missing.display(), "-");
        assert_eq!(FieldValue::Missing.as_input(), "");
    }

    #[test]
    fn test_status_keys() {
        assert_eq!(FieldValue::Bool(true).status_key().as_deref(), Some("active"));
        assert_eq!(
            FieldValue::text("Pending").status_key().as_deref(),
            Some("pending")
        );
        assert_eq!(FieldValue::Number(1.0).status_key(), None);
    }

    #[test]
    fn test_local_day_from_date_and_text() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let expected = instant.with_timezone(&Local).date_naive();
        assert_eq!(FieldValue::Date(instant).local_day(), Some(expected));
        assert_eq!(
            FieldValue::text("2024-03-10T12:00:00Z").local_day(),
            Some(expected)
        );
        assert_eq!(
            FieldValue::text("2024-03-10").local_day(),
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
        assert_eq!(FieldValue::text("soon").local_day(), None);
    }

    #[test]
    fn test_every_key_opens_a_registered_resource() {
        for key in RESOURCE_KEYS {
            assert!(
                crate::resource::get_resource(key).is_some(),
                "{} has no resource definition",
                key
            );
        }
    }
}
