//! Order-side records
//!
//! Order history entries are created by checkout, not by the console; only
//! their status is edited here. Returns and replacements are full CRUD.

use super::{FieldValue, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntry {
    #[serde(alias = "_id")]
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub total: f64,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for OrderEntry {
    const KEY: &'static str = "order-history";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "orderNumber",
        "customerName",
        "customerEmail",
        "total",
        "status",
        "createdAt",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => FieldValue::text(&self.id),
            "orderNumber" => FieldValue::text(&self.order_number),
            "customerName" => FieldValue::text(&self.customer_name),
            "customerEmail" => FieldValue::opt_text(self.customer_email.as_ref()),
            "total" => FieldValue::Number(self.total),
            "status" => FieldValue::text(&self.status),
            "createdAt" => FieldValue::opt_date(self.created_at),
            _ => FieldValue::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    #[serde(alias = "_id")]
    pub id: String,
    pub order_number: String,
    pub product_id: String,
    pub reason: String,
    #[serde(default)]
    pub quantity: Option<i64>,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for ReturnRequest {
    const KEY: &'static str = "returns";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "orderNumber",
        "productId",
        "reason",
        "quantity",
        "status",
        "createdAt",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => FieldValue::text(&self.id),
            "orderNumber" => FieldValue::text(&self.order_number),
            "productId" => FieldValue::text(&self.product_id),
            "reason" => FieldValue::text(&self.reason),
            "quantity" => FieldValue::opt_int(self.quantity),
            "status" => FieldValue::text(&self.status),
            "createdAt" => FieldValue::opt_date(self.created_at),
            _ => FieldValue::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replacement {
    #[serde(alias = "_id")]
    pub id: String,
    pub order_number: String,
    pub product_id: String,
    pub reason: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Replacement {
    const KEY: &'static str = "replacements";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "orderNumber",
        "productId",
        "reason",
        "trackingNumber",
        "status",
        "createdAt",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => FieldValue::text(&self.id),
            "orderNumber" => FieldValue::text(&self.order_number),
            "productId" => FieldValue::text(&self.product_id),
            "reason" => FieldValue::text(&self.reason),
            "trackingNumber" => FieldValue::opt_text(self.tracking_number.as_ref()),
            "status" => FieldValue::text(&self.status),
            "createdAt" => FieldValue::opt_date(self.created_at),
            _ => FieldValue::Missing,
        }
    }
}
