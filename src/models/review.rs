use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ProductId, ReviewId};
use crate::error::{Result, StorefrontError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: Uuid,
    pub name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    pub product_id: ProductId,
    pub user_id: Uuid,
    pub name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl NewReview {
    pub fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(StorefrontError::validation("rating", "rating must be between 1 and 5"));
        }
        if self.comment.trim().is_empty() {
            return Err(StorefrontError::validation("comment", "a comment is required"));
        }
        Ok(())
    }
}

/// Aggregate rating for a product.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReviewSummary {
    pub count: usize,
    /// Mean rating, `None` when there are no reviews.
    pub average: Option<f64>,
}

impl ReviewSummary {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return Self::default();
        }
        let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
        Self {
            count: reviews.len(),
            average: Some(f64::from(total) / reviews.len() as f64),
        }
    }
}
