//! Wishlist queries against the `wishlist` table.

use uuid::Uuid;

use crate::backend::{rows_into, Backend};
use crate::config;
use crate::error::Result;
use crate::models::{ProductId, WishlistEntry};
use crate::query_builder::QueryBuilder;

pub struct WishlistQuery<'a> {
    backend: &'a dyn Backend,
}

impl<'a> WishlistQuery<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// Favorited product ids for a user.
    pub fn for_user(&self, user_id: Uuid) -> Result<Vec<ProductId>> {
        let mut qb = QueryBuilder::new(config::WISHLIST);
        qb.eq("user_id", &user_id.to_string()).order_by("id", true);
        let entries: Vec<WishlistEntry> = rows_into(self.backend.select(&qb)?)?;
        Ok(entries.into_iter().map(|e| e.product_id).collect())
    }

    pub fn contains(&self, user_id: Uuid, product_id: ProductId) -> Result<bool> {
        let mut qb = entry(user_id, product_id);
        qb.limit(1);
        Ok(!self.backend.select(&qb)?.is_empty())
    }

    /// Favorite a product. Adding an existing entry is a no-op.
    pub fn add(&self, user_id: Uuid, product_id: ProductId) -> Result<()> {
        if self.contains(user_id, product_id)? {
            return Ok(());
        }
        let row = WishlistEntry {
            id: None,
            user_id,
            product_id,
        };
        self.backend
            .insert(config::WISHLIST, vec![serde_json::to_value(row)?])?;
        Ok(())
    }

    /// Returns whether an entry was removed.
    pub fn remove(&self, user_id: Uuid, product_id: ProductId) -> Result<bool> {
        Ok(self.backend.delete(&entry(user_id, product_id))? > 0)
    }
}

fn entry(user_id: Uuid, product_id: ProductId) -> QueryBuilder {
    let mut qb = QueryBuilder::new(config::WISHLIST);
    qb.eq("user_id", &user_id.to_string())
        .eq("product_id", &product_id.to_string());
    qb
}
