use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::null_as_default;
use super::{CategoryId, ProductId};
use crate::error::{Result, StorefrontError};

// ---------------------------------------------------------------------------
// Product: A catalog row mirrored read-only from the backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default, deserialize_with = "deserialize_image_urls")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stock: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_featured: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_best_seller: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_new_arrival: bool,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn has_placement(&self, placement: Placement) -> bool {
        match placement {
            Placement::Featured => self.is_featured,
            Placement::BestSeller => self.is_best_seller,
            Placement::NewArrival => self.is_new_arrival,
        }
    }
}

// ---------------------------------------------------------------------------
// Placement: Promotional slots driven by boolean product columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    Featured,
    BestSeller,
    NewArrival,
}

impl Placement {
    pub const ALL: [Placement; 3] = [Self::Featured, Self::BestSeller, Self::NewArrival];

    /// Backend column holding the flag.
    pub fn column(self) -> &'static str {
        match self {
            Self::Featured => "is_featured",
            Self::BestSeller => "is_best_seller",
            Self::NewArrival => "is_new_arrival",
        }
    }
}

// ---------------------------------------------------------------------------
// Image URL normalization
// ---------------------------------------------------------------------------

/// Normalize the `images` column into an ordered list of URLs.
///
/// The column arrives either as a JSON array or as a JSON-encoded string of
/// an array. Non-string elements are skipped; anything else yields an empty
/// list.
pub fn normalize_image_urls(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => string_items(items),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => string_items(&items),
            _ => {
                tracing::debug!(raw = %raw, "ignoring malformed image list");
                Vec::new()
            }
        },
        _ => Vec::new(),
    }
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn deserialize_image_urls<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_image_urls(&value))
}

// ---------------------------------------------------------------------------
// NewProduct / ProductUpdate: Seller-side write payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: Option<CategoryId>,
    pub images: Vec<String>,
    pub stock: i64,
    pub is_featured: bool,
    pub is_best_seller: bool,
    pub is_new_arrival: bool,
}

impl NewProduct {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(StorefrontError::validation("name", "product name is required"));
        }
        if self.price <= Decimal::ZERO {
            return Err(StorefrontError::validation("price", "price must be greater than zero"));
        }
        if self.category_id.is_none() {
            return Err(StorefrontError::validation("category_id", "a category is required"));
        }
        if self.stock < 0 {
            return Err(StorefrontError::validation("stock", "stock cannot be negative"));
        }
        Ok(())
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

impl ProductUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(StorefrontError::validation("name", "product name is required"));
        }
        if self.price.is_some_and(|p| p <= Decimal::ZERO) {
            return Err(StorefrontError::validation("price", "price must be greater than zero"));
        }
        if self.stock.is_some_and(|s| s < 0) {
            return Err(StorefrontError::validation("stock", "stock cannot be negative"));
        }
        Ok(())
    }
}
