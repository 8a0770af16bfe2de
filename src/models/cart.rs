use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Product;

/// One product-quantity pairing held in session state.
///
/// Quantity is always at least one; the store removes entries instead of
/// storing zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product: Product,
    pub quantity: u32,
}

impl CartEntry {
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}
