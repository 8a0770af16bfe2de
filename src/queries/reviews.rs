//! Review queries against the `reviews` table.

use crate::backend::{first_into, rows_into, Backend};
use crate::config;
use crate::error::{Result, StorefrontError};
use crate::models::{NewReview, ProductId, Review, ReviewSummary};
use crate::query_builder::QueryBuilder;

pub struct ReviewQuery<'a> {
    backend: &'a dyn Backend,
}

impl<'a> ReviewQuery<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// Reviews for a product, newest first.
    pub fn for_product(&self, product_id: ProductId) -> Result<Vec<Review>> {
        let mut qb = QueryBuilder::new(config::REVIEWS);
        qb.eq("product_id", &product_id.to_string())
            .order_by("created_at", false);
        rows_into(self.backend.select(&qb)?)
    }

    pub fn summary(&self, product_id: ProductId) -> Result<ReviewSummary> {
        Ok(ReviewSummary::from_reviews(&self.for_product(product_id)?))
    }

    pub fn add(&self, review: &NewReview) -> Result<Review> {
        review.validate()?;
        let rows = self
            .backend
            .insert(config::REVIEWS, vec![serde_json::to_value(review)?])?;
        first_into(rows)?.ok_or_else(|| StorefrontError::Backend {
            status: 500,
            message: "insert returned no review".to_string(),
        })
    }
}
