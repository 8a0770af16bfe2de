//! Read-only views over the cached catalog: filtering, search, sorting,
//! related products and promotional placements.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::models::{CategoryId, Placement, Product, ProductId};

// ---------------------------------------------------------------------------
// CatalogFilter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Backend order (ascending id).
    #[default]
    Catalog,
    PriceLowToHigh,
    PriceHighToLow,
    Name,
    /// Most recently created first (descending id).
    Newest,
}

/// Parameters for [`Catalog::filter`].
///
/// All fields are optional. When `None`, the corresponding filter is skipped.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub category: Option<CategoryId>,
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock_only: bool,
    pub sort: SortOrder,
}

impl CatalogFilter {
    fn matches(&self, product: &Product, needle: Option<&str>) -> bool {
        if self.category.is_some_and(|c| product.category_id != Some(c)) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if self.in_stock_only && !product.in_stock() {
            return false;
        }
        if let Some(needle) = needle {
            let hit = product.name.to_lowercase().contains(needle)
                || product.description.to_lowercase().contains(needle);
            if !hit {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Borrowing view over a slice of products.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    products: &'a [Product],
}

impl<'a> Catalog<'a> {
    pub fn new(products: &'a [Product]) -> Self {
        Self { products }
    }

    pub fn all(&self) -> &'a [Product] {
        self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn find(&self, id: ProductId) -> Option<&'a Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn filter(&self, filter: &CatalogFilter) -> Vec<&'a Product> {
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut matched: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| filter.matches(p, needle.as_deref()))
            .collect();

        sort_products(&mut matched, filter.sort);
        matched
    }

    pub fn search(&self, text: &str) -> Vec<&'a Product> {
        self.filter(&CatalogFilter {
            search: Some(text.to_string()),
            ..CatalogFilter::default()
        })
    }

    pub fn by_category(&self, category: CategoryId) -> Vec<&'a Product> {
        self.filter(&CatalogFilter {
            category: Some(category),
            ..CatalogFilter::default()
        })
    }

    /// Up to `limit` other products from the same category.
    pub fn related(&self, product: &Product, limit: usize) -> Vec<&'a Product> {
        let Some(category) = product.category_id else {
            return Vec::new();
        };
        self.products
            .iter()
            .filter(|p| p.category_id == Some(category) && p.id != product.id)
            .take(limit)
            .collect()
    }

    /// Products flagged for a promotional slot, in catalog order.
    pub fn by_placement(&self, placement: Placement) -> Vec<&'a Product> {
        self.products
            .iter()
            .filter(|p| p.has_placement(placement))
            .collect()
    }

    /// Lowest and highest price in the catalog.
    pub fn price_range(&self) -> Option<(Decimal, Decimal)> {
        let min = self.products.iter().map(|p| p.price).min()?;
        let max = self.products.iter().map(|p| p.price).max()?;
        Some((min, max))
    }
}

fn sort_products(products: &mut [&Product], order: SortOrder) {
    match order {
        SortOrder::Catalog => products.sort_by_key(|p| p.id),
        SortOrder::PriceLowToHigh => products.sort_by(|a, b| by_price(a, b).then(a.id.cmp(&b.id))),
        SortOrder::PriceHighToLow => {
            products.sort_by(|a, b| by_price(b, a).then(a.id.cmp(&b.id)))
        }
        SortOrder::Name => products.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        }),
        SortOrder::Newest => products.sort_by(|a, b| b.id.cmp(&a.id)),
    }
}

fn by_price(a: &Product, b: &Product) -> Ordering {
    a.price.cmp(&b.price)
}
