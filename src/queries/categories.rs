//! Category queries against the `categories` table.

use crate::backend::{first_into, rows_into, Backend};
use crate::config;
use crate::error::{Result, StorefrontError};
use crate::models::{Category, CategoryId, NewCategory};
use crate::query_builder::QueryBuilder;

pub struct CategoryQuery<'a> {
    backend: &'a dyn Backend,
}

impl<'a> CategoryQuery<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// All categories ordered by name.
    pub fn list(&self) -> Result<Vec<Category>> {
        let mut qb = QueryBuilder::new(config::CATEGORIES);
        qb.order_by("name", true);
        rows_into(self.backend.select(&qb)?)
    }

    pub fn get(&self, id: CategoryId) -> Result<Option<Category>> {
        let mut qb = QueryBuilder::new(config::CATEGORIES);
        qb.eq("id", &id.to_string()).limit(1);
        first_into(self.backend.select(&qb)?)
    }

    pub fn create(&self, category: &NewCategory) -> Result<Category> {
        category.validate()?;
        let rows = self
            .backend
            .insert(config::CATEGORIES, vec![serde_json::to_value(category)?])?;
        first_into(rows)?.ok_or_else(|| StorefrontError::Backend {
            status: 500,
            message: "insert returned no category".to_string(),
        })
    }

    pub fn delete(&self, id: CategoryId) -> Result<()> {
        let mut qb = QueryBuilder::new(config::CATEGORIES);
        qb.eq("id", &id.to_string());
        match self.backend.delete(&qb)? {
            0 => Err(StorefrontError::NotFound(format!("category {id}"))),
            _ => Ok(()),
        }
    }
}
