use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ProductId;

/// Presence of a row means the user has favorited the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub user_id: Uuid,
    pub product_id: ProductId,
}
