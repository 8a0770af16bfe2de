//! Profile queries against the `users` table.

use serde_json::json;
use uuid::Uuid;

use crate::backend::{first_into, Backend};
use crate::config;
use crate::error::{Result, StorefrontError};
use crate::models::UserProfile;
use crate::query_builder::QueryBuilder;

pub struct UserQuery<'a> {
    backend: &'a dyn Backend,
}

impl<'a> UserQuery<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    pub fn get(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let mut qb = QueryBuilder::new(config::USERS);
        qb.eq("id", &id.to_string()).limit(1);
        first_into(self.backend.select(&qb)?)
    }

    pub fn create(&self, profile: &UserProfile) -> Result<UserProfile> {
        let rows = self
            .backend
            .insert(config::USERS, vec![serde_json::to_value(profile)?])?;
        first_into(rows)?.ok_or_else(|| StorefrontError::Backend {
            status: 500,
            message: "insert returned no profile".to_string(),
        })
    }

    pub fn update_name(&self, id: Uuid, name: &str) -> Result<UserProfile> {
        if name.trim().is_empty() {
            return Err(StorefrontError::validation("name", "name is required"));
        }
        let mut qb = QueryBuilder::new(config::USERS);
        qb.eq("id", &id.to_string());
        first_into(self.backend.update(&qb, &json!({ "name": name.trim() }))?)?
            .ok_or_else(|| StorefrontError::NotFound(format!("user {id}")))
    }
}
