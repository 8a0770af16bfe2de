//! In-process implementation of [`Backend`].
//!
//! Tables are vectors of JSON rows evaluated with [`QueryBuilder::apply`].
//! Clones share the same tables, so a test can keep a handle for seeding and
//! inspection while a [`Storefront`](crate::Storefront) owns another. Each
//! clone carries its own session, like separate browser sessions against one
//! project.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::Backend;
use crate::error::{Result, StorefrontError};
use crate::models::{AuthUser, Credentials, Session};
use crate::query_builder::QueryBuilder;

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Value>>,
    next_ids: HashMap<String, i64>,
    /// email -> (password, user)
    accounts: HashMap<String, (String, AuthUser)>,
    objects: HashMap<String, Vec<u8>>,
    unavailable: HashSet<String>,
}

#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    session: Option<Session>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StorefrontError::InvalidArgument("memory backend lock poisoned".into()))
    }

    /// Insert rows as-is (generating ids only where missing).
    pub fn seed(&self, table: &str, rows: Vec<Value>) -> Result<()> {
        self.insert(table, rows).map(|_| ())
    }

    /// Snapshot of every row in a table.
    pub fn rows(&self, table: &str) -> Result<Vec<Value>> {
        Ok(self.lock()?.tables.get(table).cloned().unwrap_or_default())
    }

    /// Stored bytes for an uploaded object.
    pub fn object(&self, bucket: &str, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.objects.get(&object_key(bucket, path)).cloned())
    }

    /// Paths of the objects stored in `bucket`, sorted.
    pub fn objects(&self, bucket: &str) -> Result<Vec<String>> {
        let prefix = format!("{bucket}/");
        let mut paths: Vec<String> = self
            .lock()?
            .objects
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Make every operation on `table` fail with a 503, or restore it.
    pub fn set_unavailable(&self, table: &str, unavailable: bool) -> Result<()> {
        let mut state = self.lock()?;
        if unavailable {
            state.unavailable.insert(table.to_string());
        } else {
            state.unavailable.remove(table);
        }
        Ok(())
    }
}

impl MemoryState {
    fn check_available(&self, table: &str) -> Result<()> {
        if self.unavailable.contains(table) {
            return Err(StorefrontError::Backend {
                status: 503,
                message: format!("{table} is unavailable"),
            });
        }
        Ok(())
    }

    fn next_id(&mut self, table: &str) -> i64 {
        let existing_max = self
            .tables
            .get(table)
            .into_iter()
            .flatten()
            .filter_map(|row| row.get("id").and_then(Value::as_i64))
            .max()
            .unwrap_or(0);
        let counter = self.next_ids.entry(table.to_string()).or_insert(0);
        *counter = (*counter).max(existing_max) + 1;
        *counter
    }
}

impl Backend for MemoryBackend {
    fn select(&self, query: &QueryBuilder) -> Result<Vec<Value>> {
        let state = self.lock()?;
        state.check_available(query.table())?;
        let rows = state
            .tables
            .get(query.table())
            .map(|rows| query.apply(rows))
            .unwrap_or_default();
        Ok(rows)
    }

    fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>> {
        let mut state = self.lock()?;
        state.check_available(table)?;

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let Value::Object(mut map) = row else {
                return Err(StorefrontError::InvalidArgument(format!(
                    "rows inserted into {table} must be objects"
                )));
            };
            if map.get("id").map_or(true, Value::is_null) {
                let id = state.next_id(table);
                map.insert("id".to_string(), Value::from(id));
            }
            inserted.push(Value::Object(map));
        }

        state
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(inserted.iter().cloned());
        debug!(table, rows = inserted.len(), "memory insert");
        Ok(inserted)
    }

    fn update(&self, query: &QueryBuilder, patch: &Value) -> Result<Vec<Value>> {
        if query.filters().is_empty() {
            return Err(StorefrontError::InvalidArgument(format!(
                "refusing unfiltered write to {}",
                query.table()
            )));
        }
        let Value::Object(fields) = patch else {
            return Err(StorefrontError::InvalidArgument("patch must be an object".into()));
        };

        let mut state = self.lock()?;
        state.check_available(query.table())?;

        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(query.table()) {
            for row in rows.iter_mut().filter(|r| query.matches(r)) {
                if let Value::Object(map) = row {
                    for (k, v) in fields {
                        map.insert(k.clone(), v.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    fn delete(&self, query: &QueryBuilder) -> Result<usize> {
        if query.filters().is_empty() {
            return Err(StorefrontError::InvalidArgument(format!(
                "refusing unfiltered write to {}",
                query.table()
            )));
        }
        let mut state = self.lock()?;
        state.check_available(query.table())?;

        let Some(rows) = state.tables.get_mut(query.table()) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !query.matches(r));
        Ok(before - rows.len())
    }

    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String> {
        let mut state = self.lock()?;
        state.check_available(bucket)?;
        state.objects.insert(object_key(bucket, path), bytes);
        Ok(format!("memory://{bucket}/{path}"))
    }

    fn remove_object(&self, bucket: &str, path: &str) -> Result<()> {
        let mut state = self.lock()?;
        state.check_available(bucket)?;
        state.objects.remove(&object_key(bucket, path));
        Ok(())
    }

    fn sign_up(&mut self, credentials: &Credentials) -> Result<Option<Session>> {
        let email = credentials.email.trim().to_lowercase();
        let user = {
            let mut state = self.lock()?;
            if state.accounts.contains_key(&email) {
                return Err(StorefrontError::Auth("User already registered".into()));
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: Some(email.clone()),
            };
            state
                .accounts
                .insert(email, (credentials.password.clone(), user.clone()));
            user
        };
        let session = issue_session(user);
        self.session = Some(session.clone());
        Ok(Some(session))
    }

    fn sign_in(&mut self, credentials: &Credentials) -> Result<Session> {
        let email = credentials.email.trim().to_lowercase();
        let user = {
            let state = self.lock()?;
            match state.accounts.get(&email) {
                Some((password, user)) if *password == credentials.password => user.clone(),
                _ => return Err(StorefrontError::Auth("Invalid login credentials".into())),
            }
        };
        let session = issue_session(user);
        self.session = Some(session.clone());
        Ok(session)
    }

    fn sign_out(&mut self) -> Result<()> {
        self.session = None;
        Ok(())
    }

    fn session(&self) -> Result<Option<Session>> {
        Ok(self.session.clone())
    }
}

fn issue_session(user: AuthUser) -> Session {
    Session {
        access_token: format!("memory-{}", Uuid::new_v4()),
        refresh_token: None,
        user,
    }
}

fn object_key(bucket: &str, path: &str) -> String {
    format!("{bucket}/{path}")
}
