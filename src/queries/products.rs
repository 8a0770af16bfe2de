//! Product queries against the `products` table.

use chrono::Utc;
use serde_json::{json, Value};

use crate::backend::{first_into, rows_into, Backend};
use crate::config;
use crate::error::{Result, StorefrontError};
use crate::models::{CategoryId, NewProduct, Placement, Product, ProductId, ProductUpdate};
use crate::query_builder::QueryBuilder;

/// An image file to store alongside a product.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            content_type: content_type.into(),
        }
    }
}

/// Where an uploaded image ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Object path inside the product-image bucket.
    pub path: String,
    /// Public URL to list on the product.
    pub url: String,
}

// ---------------------------------------------------------------------------
// ProductQuery
// ---------------------------------------------------------------------------

/// Query interface for the product catalog.
pub struct ProductQuery<'a> {
    backend: &'a dyn Backend,
}

impl<'a> ProductQuery<'a> {
    /// Create a new `ProductQuery` bound to the given backend.
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// Fetch the full catalog in id order.
    ///
    /// Image lists are normalized while deserializing, so a malformed
    /// `images` column yields an empty list rather than an error.
    pub fn list_all(&self) -> Result<Vec<Product>> {
        let mut qb = QueryBuilder::new(config::PRODUCTS);
        qb.order_by("id", true);
        rows_into(self.backend.select(&qb)?)
    }

    pub fn get(&self, id: ProductId) -> Result<Option<Product>> {
        let mut qb = QueryBuilder::new(config::PRODUCTS);
        qb.eq("id", &id.to_string()).limit(1);
        first_into(self.backend.select(&qb)?)
    }

    pub fn by_category(&self, category: CategoryId) -> Result<Vec<Product>> {
        let mut qb = QueryBuilder::new(config::PRODUCTS);
        qb.eq("category_id", &category.to_string()).order_by("id", true);
        rows_into(self.backend.select(&qb)?)
    }

    /// Server-side name search (case-insensitive substring).
    pub fn search(&self, name: &str, limit: Option<usize>) -> Result<Vec<Product>> {
        let mut qb = QueryBuilder::new(config::PRODUCTS);
        qb.ilike("name", &format!("%{}%", name.trim())).order_by("id", true);
        if let Some(l) = limit {
            qb.limit(l);
        }
        rows_into(self.backend.select(&qb)?)
    }

    // -- Writes (seller panel) ---------------------------------------------

    pub fn create(&self, product: &NewProduct) -> Result<Product> {
        product.validate()?;
        let rows = self
            .backend
            .insert(config::PRODUCTS, vec![serde_json::to_value(product)?])?;
        first_into(rows)?.ok_or_else(|| StorefrontError::Backend {
            status: 500,
            message: "insert returned no product".to_string(),
        })
    }

    pub fn update(&self, id: ProductId, update: &ProductUpdate) -> Result<Product> {
        update.validate()?;
        self.patch(id, &serde_json::to_value(update)?)
    }

    pub fn set_stock(&self, id: ProductId, stock: i64) -> Result<Product> {
        if stock < 0 {
            return Err(StorefrontError::validation("stock", "stock cannot be negative"));
        }
        self.patch(id, &json!({ "stock": stock }))
    }

    pub fn set_placement(
        &self,
        id: ProductId,
        placement: Placement,
        enabled: bool,
    ) -> Result<Product> {
        let mut patch = serde_json::Map::new();
        patch.insert(placement.column().to_string(), Value::Bool(enabled));
        self.patch(id, &Value::Object(patch))
    }

    pub fn delete(&self, id: ProductId) -> Result<()> {
        let mut qb = QueryBuilder::new(config::PRODUCTS);
        qb.eq("id", &id.to_string());
        match self.backend.delete(&qb)? {
            0 => Err(StorefrontError::NotFound(format!("product {id}"))),
            _ => Ok(()),
        }
    }

    /// Upload an image to the product-image bucket.
    ///
    /// Files are stored under `products/{timestamp}-{file_name}` so repeated
    /// uploads of the same name do not overwrite each other.
    pub fn upload_image(&self, image: ImageUpload) -> Result<StoredImage> {
        let file_name = sanitize_file_name(&image.file_name);
        if file_name.is_empty() {
            return Err(StorefrontError::validation("file_name", "image file name is required"));
        }
        if image.bytes.is_empty() {
            return Err(StorefrontError::validation("image", "image file is empty"));
        }
        let path = format!("products/{}-{}", Utc::now().timestamp_millis(), file_name);
        let url = self.backend.upload(
            config::PRODUCT_IMAGES_BUCKET,
            &path,
            image.bytes,
            &image.content_type,
        )?;
        Ok(StoredImage { path, url })
    }

    /// Remove a previously uploaded image by its object path.
    pub fn remove_image(&self, path: &str) -> Result<()> {
        self.backend.remove_object(config::PRODUCT_IMAGES_BUCKET, path)
    }

    fn patch(&self, id: ProductId, patch: &Value) -> Result<Product> {
        let mut qb = QueryBuilder::new(config::PRODUCTS);
        qb.eq("id", &id.to_string());
        first_into(self.backend.update(&qb, patch)?)?
            .ok_or_else(|| StorefrontError::NotFound(format!("product {id}")))
    }
}

fn sanitize_file_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
