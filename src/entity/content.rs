//! Content records

use super::{FieldValue, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    #[serde(alias = "_id")]
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Faq {
    const KEY: &'static str = "faqs";
    const FIELDS: &'static [&'static str] =
        &["id", "question", "answer", "category", "active", "createdAt"];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => FieldValue::text(&self.id),
            "question" => FieldValue::text(&self.question),
            "answer" => FieldValue::text(&self.answer),
            "category" => FieldValue::opt_text(self.category.as_ref()),
            "active" => FieldValue::Bool(self.active),
            "createdAt" => FieldValue::opt_date(self.created_at),
            _ => FieldValue::Missing,
        }
    }
}
