//! Catalog records: products and the collections hanging off them

use super::{FieldValue, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Product {
    const KEY: &'static str = "products";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "slug",
        "description",
        "category",
        "price",
        "active",
        "createdAt",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => FieldValue::text(&self.id),
            "title" => FieldValue::text(&self.title),
            "slug" => FieldValue::text(&self.slug),
            "description" => FieldValue::opt_text(self.description.as_ref()),
            "category" => FieldValue::opt_text(self.category.as_ref()),
            "price" => FieldValue::opt_number(self.price),
            "active" => FieldValue::Bool(self.active),
            "createdAt" => FieldValue::opt_date(self.created_at),
            _ => FieldValue::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    #[serde(alias = "_id")]
    pub id: String,
    pub product_id: String,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Variant {
    const KEY: &'static str = "variants";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "productId",
        "name",
        "sku",
        "price",
        "stock",
        "status",
        "createdAt",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => FieldValue::text(&self.id),
            "productId" => FieldValue::text(&self.product_id),
            "name" => FieldValue::text(&self.name),
            "sku" => FieldValue::opt_text(self.sku.as_ref()),
            "price" => FieldValue::opt_number(self.price),
            "stock" => FieldValue::opt_int(self.stock),
            "status" => FieldValue::Bool(self.status),
            "createdAt" => FieldValue::opt_date(self.created_at),
            _ => FieldValue::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Tag {
    const KEY: &'static str = "tags";
    const FIELDS: &'static [&'static str] =
        &["id", "name", "slug", "description", "active", "createdAt"];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => FieldValue::text(&self.id),
            "name" => FieldValue::text(&self.name),
            "slug" => FieldValue::text(&self.slug),
            "description" => FieldValue::opt_text(self.description.as_ref()),
            "active" => FieldValue::Bool(self.active),
            "createdAt" => FieldValue::opt_date(self.created_at),
            _ => FieldValue::Missing,
        }
    }
}

/// Price row for a product, optionally narrowed to one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRow {
    #[serde(alias = "_id")]
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub mrp: Option<f64>,
    pub selling_price: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for PriceRow {
    const KEY: &'static str = "pricing";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "productId",
        "variantId",
        "mrp",
        "sellingPrice",
        "currency",
        "createdAt",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => FieldValue::text(&self.id),
            "productId" => FieldValue::text(&self.product_id),
            "variantId" => FieldValue::opt_text(self.variant_id.as_ref()),
            "mrp" => FieldValue::opt_number(self.mrp),
            "sellingPrice" => FieldValue::Number(self.selling_price),
            "currency" => FieldValue::opt_text(self.currency.as_ref()),
            "createdAt" => FieldValue::opt_date(self.created_at),
            _ => FieldValue::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoMeta {
    #[serde(alias = "_id")]
    pub id: String,
    pub product_id: String,
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for SeoMeta {
    const KEY: &'static str = "seo";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "productId",
        "metaTitle",
        "metaDescription",
        "keywords",
        "canonicalUrl",
        "updatedAt",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => FieldValue::text(&self.id),
            "productId" => FieldValue::text(&self.product_id),
            "metaTitle" => FieldValue::text(&self.meta_title),
            "metaDescription" => FieldValue::opt_text(self.meta_description.as_ref()),
            "keywords" => FieldValue::opt_text(self.keywords.as_ref()),
            "canonicalUrl" => FieldValue::opt_text(self.canonical_url.as_ref()),
            "updatedAt" => FieldValue::opt_date(self.updated_at),
            _ => FieldValue::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    #[serde(alias = "_id")]
    pub id: String,
    pub product_id: String,
    pub image_url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for GalleryImage {
    const KEY: &'static str = "gallery";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "productId",
        "imageUrl",
        "altText",
        "position",
        "active",
        "createdAt",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => FieldValue::text(&self.id),
            "productId" => FieldValue::text(&self.product_id),
            "imageUrl" => FieldValue::text(&self.image_url),
            "altText" => FieldValue::opt_text(self.alt_text.as_ref()),
            "position" => FieldValue::opt_int(self.position),
            "active" => FieldValue::Bool(self.active),
            "createdAt" => FieldValue::opt_date(self.created_at),
            _ => FieldValue::Missing,
        }
    }
}
