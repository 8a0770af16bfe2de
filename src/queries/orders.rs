//! Order queries against the `orders` and `order_items` tables.
//!
//! Orders and their line items are written in two inserts. If the line items
//! cannot be written the order row is deleted again, so a failed checkout
//! never leaves an order without items.

use std::collections::HashMap;

use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::backend::{first_into, rows_into, Backend};
use crate::config;
use crate::error::{Result, StorefrontError};
use crate::models::{NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderStatus};
use crate::query_builder::QueryBuilder;

pub struct OrderQuery<'a> {
    backend: &'a dyn Backend,
}

impl<'a> OrderQuery<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// Insert an order and its line items.
    pub fn create(&self, order: &NewOrder, items: &[NewOrderItem]) -> Result<Order> {
        if items.is_empty() {
            return Err(StorefrontError::validation("items", "an order needs at least one item"));
        }

        let rows = self
            .backend
            .insert(config::ORDERS, vec![serde_json::to_value(order)?])?;
        let mut created: Order = first_into(rows)?.ok_or_else(|| StorefrontError::Backend {
            status: 500,
            message: "insert returned no order".to_string(),
        })?;

        let item_rows = items
            .iter()
            .map(|item| {
                serde_json::to_value(OrderItem {
                    id: None,
                    order_id: created.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        match self.backend.insert(config::ORDER_ITEMS, item_rows) {
            Ok(rows) => {
                created.items = rows_into(rows)?;
                Ok(created)
            }
            Err(e) => {
                warn!(order_id = %created.id, error = %e, "line items failed, removing order");
                let mut qb = QueryBuilder::new(config::ORDERS);
                qb.eq("id", &created.id.to_string());
                if let Err(cleanup) = self.backend.delete(&qb) {
                    warn!(order_id = %created.id, error = %cleanup, "could not remove incomplete order");
                }
                Err(e)
            }
        }
    }

    /// Orders placed by `user_id`, newest first, with line items.
    pub fn for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let mut qb = QueryBuilder::new(config::ORDERS);
        qb.eq("user_id", &user_id.to_string())
            .order_by("created_at", false);
        self.with_items(rows_into(self.backend.select(&qb)?)?)
    }

    /// Every order, newest first, optionally restricted to one status.
    pub fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let mut qb = QueryBuilder::new(config::ORDERS);
        if let Some(s) = status {
            qb.eq("status", s.as_str());
        }
        qb.order_by("created_at", false);
        self.with_items(rows_into(self.backend.select(&qb)?)?)
    }

    pub fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let mut qb = QueryBuilder::new(config::ORDERS);
        qb.eq("id", &id.to_string()).limit(1);
        let orders: Vec<Order> = rows_into(self.backend.select(&qb)?)?;
        Ok(self.with_items(orders)?.into_iter().next())
    }

    pub fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        let mut qb = QueryBuilder::new(config::ORDERS);
        qb.eq("id", &id.to_string());
        let updated: Option<Order> =
            first_into(self.backend.update(&qb, &json!({ "status": status }))?)?;
        let mut order = updated.ok_or_else(|| StorefrontError::NotFound(format!("order {id}")))?;
        order.items = self.load_items(&[order.id])?.remove(&order.id).unwrap_or_default();
        Ok(order)
    }

    /// Attach line items to each order with a single `order_items` query.
    fn with_items(&self, mut orders: Vec<Order>) -> Result<Vec<Order>> {
        if orders.is_empty() {
            return Ok(orders);
        }
        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        let mut grouped = self.load_items(&ids)?;
        for order in &mut orders {
            order.items = grouped.remove(&order.id).unwrap_or_default();
        }
        Ok(orders)
    }

    fn load_items(&self, order_ids: &[OrderId]) -> Result<HashMap<OrderId, Vec<OrderItem>>> {
        let ids: Vec<String> = order_ids.iter().map(ToString::to_string).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let mut qb = QueryBuilder::new(config::ORDER_ITEMS);
        qb.in_list("order_id", &id_refs).order_by("id", true);

        let items: Vec<OrderItem> = rows_into(self.backend.select(&qb)?)?;
        let mut grouped: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in items {
            grouped.entry(item.order_id).or_default().push(item);
        }
        Ok(grouped)
    }
}
