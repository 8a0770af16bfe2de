//! Seller admin panel: product and category management, order fulfilment and
//! dashboard figures.
//!
//! Obtained through [`Storefront::admin`](crate::Storefront::admin), which
//! checks the signed-in user's role first. Changes are written straight to
//! the backend; call [`Storefront::fetch_products`](crate::Storefront::fetch_products)
//! afterwards to refresh the cached catalog.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::error::{Result, StorefrontError};
use crate::models::{
    Category, CategoryId, NewCategory, NewProduct, Order, OrderId, OrderStatus, Placement,
    Product, ProductId, ProductUpdate,
};
use crate::queries::{CategoryQuery, ImageUpload, OrderQuery, ProductQuery};

/// Figures shown on the seller dashboard.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardStats {
    pub order_count: usize,
    /// Sum of order amounts, excluding cancelled orders.
    pub revenue: Decimal,
    pub orders_by_status: BTreeMap<OrderStatus, usize>,
    pub product_count: usize,
    pub out_of_stock: usize,
}

pub struct AdminPanel<'a> {
    backend: &'a dyn Backend,
}

impl fmt::Debug for AdminPanel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminPanel").finish_non_exhaustive()
    }
}

impl<'a> AdminPanel<'a> {
    pub(crate) fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    fn products(&self) -> ProductQuery<'a> {
        ProductQuery::new(self.backend)
    }

    fn orders(&self) -> OrderQuery<'a> {
        OrderQuery::new(self.backend)
    }

    // -- Products ----------------------------------------------------------

    /// Validate, upload images, then insert the product with the uploaded
    /// image URLs appended to any it already lists.
    ///
    /// Validation runs before any upload so a rejected form stores nothing.
    /// If a later upload or the insert fails, images already uploaded for
    /// this product are removed again.
    pub fn add_product(
        &self,
        mut product: NewProduct,
        images: Vec<ImageUpload>,
    ) -> Result<Product> {
        product.validate()?;
        let mut stored = Vec::with_capacity(images.len());
        let result = images
            .into_iter()
            .try_for_each(|image| -> Result<()> {
                let image = self.products().upload_image(image)?;
                product.images.push(image.url);
                stored.push(image.path);
                Ok(())
            })
            .and_then(|()| self.products().create(&product));

        match result {
            Ok(created) => {
                info!(product_id = %created.id, name = %created.name, "product added");
                Ok(created)
            }
            Err(e) => {
                warn!(error = %e, uploaded = stored.len(), "product not added, removing images");
                for path in &stored {
                    if let Err(cleanup) = self.products().remove_image(path) {
                        warn!(path = %path, error = %cleanup, "could not remove uploaded image");
                    }
                }
                Err(e)
            }
        }
    }

    pub fn update_product(&self, id: ProductId, update: &ProductUpdate) -> Result<Product> {
        self.products().update(id, update)
    }

    pub fn set_stock(&self, id: ProductId, stock: i64) -> Result<Product> {
        self.products().set_stock(id, stock)
    }

    pub fn set_placement(
        &self,
        id: ProductId,
        placement: Placement,
        enabled: bool,
    ) -> Result<Product> {
        self.products().set_placement(id, placement, enabled)
    }

    pub fn delete_product(&self, id: ProductId) -> Result<()> {
        self.products().delete(id)?;
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    // -- Categories --------------------------------------------------------

    pub fn add_category(&self, category: &NewCategory) -> Result<Category> {
        CategoryQuery::new(self.backend).create(category)
    }

    /// Delete a category that no product still references.
    pub fn delete_category(&self, id: CategoryId) -> Result<()> {
        if !self.products().by_category(id)?.is_empty() {
            return Err(StorefrontError::InvalidArgument(format!(
                "category {id} still has products"
            )));
        }
        CategoryQuery::new(self.backend).delete(id)
    }

    // -- Orders ------------------------------------------------------------

    pub fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        self.orders().list(status)
    }

    /// Move an order to a new status. Delivered and cancelled orders are final.
    pub fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        let current = self
            .orders()
            .get(id)?
            .ok_or_else(|| StorefrontError::NotFound(format!("order {id}")))?;
        if current.status == status {
            return Ok(current);
        }
        if current.status.is_final() {
            return Err(StorefrontError::InvalidArgument(format!(
                "order {id} is already {}",
                current.status
            )));
        }
        let updated = self.orders().update_status(id, status)?;
        info!(order_id = %id, from = %current.status, to = %status, "order status changed");
        Ok(updated)
    }

    pub fn dashboard(&self) -> Result<DashboardStats> {
        let orders = self.orders().list(None)?;
        let products = self.products().list_all()?;

        let mut stats = DashboardStats {
            order_count: orders.len(),
            product_count: products.len(),
            out_of_stock: products.iter().filter(|p| !p.in_stock()).count(),
            ..DashboardStats::default()
        };
        for order in &orders {
            *stats.orders_by_status.entry(order.status).or_insert(0) += 1;
            if order.status != OrderStatus::Cancelled {
                stats.revenue += order.amount;
            }
        }
        Ok(stats)
    }
}
