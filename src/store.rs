//! Session-local client state: cart, catalog cache, wishlist and addresses.
//!
//! The store holds no backend handle. [`Storefront`](crate::Storefront) fills
//! the mirrors from backend responses and routes presentation-layer mutations
//! here, so everything in this module is plain in-memory bookkeeping.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Result, StorefrontError};
use crate::models::{Address, AddressId, CartEntry, Product, ProductId};

/// Decimal places kept by [`ClientStore::cart_amount`].
pub const AMOUNT_SCALE: u32 = 2;

#[derive(Debug, Clone, Default)]
pub struct ClientStore {
    cart: BTreeMap<ProductId, CartEntry>,
    catalog: Vec<Product>,
    catalog_error: Option<String>,
    wishlist: BTreeSet<ProductId>,
    addresses: Vec<Address>,
}

impl ClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Cart --------------------------------------------------------------

    /// Add one unit of `product`, creating the entry if needed.
    ///
    /// The stored snapshot is refreshed so totals use the latest price.
    pub fn add_to_cart(&mut self, product: &Product) {
        self.cart
            .entry(product.id)
            .and_modify(|entry| {
                entry.quantity = entry.quantity.saturating_add(1);
                entry.product = product.clone();
            })
            .or_insert_with(|| CartEntry {
                product: product.clone(),
                quantity: 1,
            });
    }

    /// Set the quantity of an existing entry. Zero or less removes it.
    ///
    /// Returns [`StorefrontError::NotFound`] and leaves the cart untouched
    /// when the product is not in the cart.
    pub fn update_cart_quantity(&mut self, product_id: ProductId, quantity: i64) -> Result<()> {
        if !self.cart.contains_key(&product_id) {
            return Err(StorefrontError::NotFound(format!(
                "product {product_id} is not in the cart"
            )));
        }

        if quantity <= 0 {
            self.cart.remove(&product_id);
            return Ok(());
        }

        let quantity = u32::try_from(quantity).map_err(|_| {
            StorefrontError::InvalidArgument(format!("quantity {quantity} is too large"))
        })?;
        if let Some(entry) = self.cart.get_mut(&product_id) {
            entry.quantity = quantity;
        }
        Ok(())
    }

    pub fn remove_from_cart(&mut self, product_id: ProductId) -> Option<CartEntry> {
        self.cart.remove(&product_id)
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Total number of units across all entries.
    pub fn cart_count(&self) -> u64 {
        self.cart.values().map(|e| u64::from(e.quantity)).sum()
    }

    /// Sum of price × quantity, truncated toward negative infinity to two
    /// decimal places (15.005 becomes 15.00, never 15.01).
    pub fn cart_amount(&self) -> Decimal {
        let total: Decimal = self.cart.values().map(CartEntry::line_total).sum();
        total.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::ToNegativeInfinity)
    }

    pub fn cart_quantity(&self, product_id: ProductId) -> Option<u32> {
        self.cart.get(&product_id).map(|e| e.quantity)
    }

    /// Entries ordered by product id.
    pub fn cart_entries(&self) -> impl Iterator<Item = &CartEntry> {
        self.cart.values()
    }

    pub fn cart_is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    // -- Catalog -----------------------------------------------------------

    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    /// Replace the cached catalog and clear any previous fetch error.
    pub fn replace_catalog(&mut self, products: Vec<Product>) {
        self.catalog = products;
        self.catalog_error = None;
    }

    /// Record a failed fetch. The cached catalog is kept as it was.
    pub fn set_catalog_error(&mut self, message: impl Into<String>) {
        self.catalog_error = Some(message.into());
    }

    /// Message from the most recent failed catalog fetch.
    pub fn catalog_error(&self) -> Option<&str> {
        self.catalog_error.as_deref()
    }

    pub fn product(&self, product_id: ProductId) -> Option<&Product> {
        self.catalog.iter().find(|p| p.id == product_id)
    }

    // -- Wishlist ----------------------------------------------------------

    pub fn set_wishlist(&mut self, product_ids: impl IntoIterator<Item = ProductId>) {
        self.wishlist = product_ids.into_iter().collect();
    }

    pub fn wishlist(&self) -> &BTreeSet<ProductId> {
        &self.wishlist
    }

    pub fn is_wishlisted(&self, product_id: ProductId) -> bool {
        self.wishlist.contains(&product_id)
    }

    pub(crate) fn mark_wishlisted(&mut self, product_id: ProductId, wishlisted: bool) {
        if wishlisted {
            self.wishlist.insert(product_id);
        } else {
            self.wishlist.remove(&product_id);
        }
    }

    // -- Addresses ---------------------------------------------------------

    pub fn set_addresses(&mut self, addresses: Vec<Address>) {
        self.addresses = addresses;
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn address(&self, address_id: AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == address_id)
    }

    pub(crate) fn upsert_address(&mut self, address: Address) {
        match self.addresses.iter_mut().find(|a| a.id == address.id) {
            Some(existing) => *existing = address,
            None => self.addresses.push(address),
        }
    }

    pub(crate) fn remove_address(&mut self, address_id: AddressId) {
        self.addresses.retain(|a| a.id != address_id);
    }

    /// Drop everything tied to the signed-in user. The cart survives.
    pub(crate) fn clear_user_data(&mut self) {
        self.wishlist.clear();
        self.addresses.clear();
    }
}
