//! Application-wide switches from the key-value `feature_flags` table.

use serde_json::{json, Value};

use crate::backend::{first_into, rows_into, Backend};
use crate::config;
use crate::error::Result;
use crate::models::FeatureFlag;
use crate::query_builder::QueryBuilder;

pub struct FlagQuery<'a> {
    backend: &'a dyn Backend,
}

impl<'a> FlagQuery<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    pub fn list(&self) -> Result<Vec<FeatureFlag>> {
        let mut qb = QueryBuilder::new(config::FEATURE_FLAGS);
        qb.order_by("key", true);
        rows_into(self.backend.select(&qb)?)
    }

    pub fn get(&self, key: &str) -> Result<Option<FeatureFlag>> {
        first_into(self.backend.select(&by_key(key))?)
    }

    /// Missing flags read as disabled.
    pub fn is_enabled(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some_and(|f| f.enabled()))
    }

    /// Create or overwrite a flag.
    pub fn set(&self, key: &str, value: Value) -> Result<FeatureFlag> {
        let updated: Option<FeatureFlag> =
            first_into(self.backend.update(&by_key(key), &json!({ "value": value }))?)?;
        if let Some(flag) = updated {
            return Ok(flag);
        }
        let flag = FeatureFlag {
            key: key.to_string(),
            value,
        };
        self.backend
            .insert(config::FEATURE_FLAGS, vec![serde_json::to_value(&flag)?])?;
        Ok(flag)
    }
}

fn by_key(key: &str) -> QueryBuilder {
    let mut qb = QueryBuilder::new(config::FEATURE_FLAGS);
    qb.eq("key", key);
    qb
}
