//! Address queries against the `addresses` table. Every operation is scoped
//! to the owning user.

use serde_json::Value;
use uuid::Uuid;

use crate::backend::{first_into, rows_into, Backend};
use crate::config;
use crate::error::{Result, StorefrontError};
use crate::models::{Address, AddressId, NewAddress};
use crate::query_builder::QueryBuilder;

pub struct AddressQuery<'a> {
    backend: &'a dyn Backend,
}

impl<'a> AddressQuery<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    pub fn for_user(&self, user_id: Uuid) -> Result<Vec<Address>> {
        let mut qb = QueryBuilder::new(config::ADDRESSES);
        qb.eq("user_id", &user_id.to_string()).order_by("id", true);
        rows_into(self.backend.select(&qb)?)
    }

    pub fn insert(&self, user_id: Uuid, address: &NewAddress) -> Result<Address> {
        address.validate()?;
        let mut row = serde_json::to_value(address)?;
        if let Value::Object(map) = &mut row {
            map.insert("user_id".to_string(), Value::String(user_id.to_string()));
        }
        let rows = self.backend.insert(config::ADDRESSES, vec![row])?;
        first_into(rows)?.ok_or_else(|| StorefrontError::Backend {
            status: 500,
            message: "insert returned no address".to_string(),
        })
    }

    pub fn update(&self, user_id: Uuid, id: AddressId, address: &NewAddress) -> Result<Address> {
        address.validate()?;
        let mut patch = serde_json::to_value(address)?;
        if let Value::Object(map) = &mut patch {
            map.entry("postal_code").or_insert(Value::Null);
        }
        first_into(self.backend.update(&owned(user_id, id), &patch)?)?
            .ok_or_else(|| StorefrontError::NotFound(format!("address {id}")))
    }

    pub fn delete(&self, user_id: Uuid, id: AddressId) -> Result<()> {
        match self.backend.delete(&owned(user_id, id))? {
            0 => Err(StorefrontError::NotFound(format!("address {id}"))),
            _ => Ok(()),
        }
    }
}

fn owned(user_id: Uuid, id: AddressId) -> QueryBuilder {
    let mut qb = QueryBuilder::new(config::ADDRESSES);
    qb.eq("id", &id.to_string()).eq("user_id", &user_id.to_string());
    qb
}
