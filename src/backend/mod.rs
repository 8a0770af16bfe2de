//! The request/response seam between the storefront and its hosted backend.
//!
//! A [`Backend`] exposes generic table operations (select, insert, update,
//! delete), object upload for product images, and password authentication.
//! Rows travel as `serde_json::Value`; the query modules deserialize them into
//! typed models.

pub mod memory;
pub mod rest;

pub use memory::MemoryBackend;
pub use rest::RestBackend;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::models::{Credentials, Session};
use crate::query_builder::QueryBuilder;

/// Table, storage and auth operations offered by the hosted backend.
///
/// Implementations never retry; a failed call is reported to the caller as-is.
pub trait Backend: Send {
    /// Return the rows matched by `query`.
    fn select(&self, query: &QueryBuilder) -> Result<Vec<Value>>;

    /// Insert rows into `table` and return them as stored (with generated ids).
    fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>>;

    /// Merge `patch` into every row matched by `query` and return the updated rows.
    ///
    /// Queries without filters are rejected.
    fn update(&self, query: &QueryBuilder, patch: &Value) -> Result<Vec<Value>>;

    /// Delete the rows matched by `query` and return how many were removed.
    ///
    /// Queries without filters are rejected.
    fn delete(&self, query: &QueryBuilder) -> Result<usize>;

    /// Store an object and return its public URL.
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String>;

    /// Remove a stored object. Removing a missing object is not an error.
    fn remove_object(&self, bucket: &str, path: &str) -> Result<()>;

    /// Register a new account. Returns `None` when the service requires the
    /// address to be confirmed before a session is issued.
    fn sign_up(&mut self, credentials: &Credentials) -> Result<Option<Session>>;

    fn sign_in(&mut self, credentials: &Credentials) -> Result<Session>;

    /// End the current session. Local session state is dropped even if the
    /// remote call fails.
    fn sign_out(&mut self) -> Result<()>;

    /// The active session, if any, as confirmed by the auth service.
    fn session(&self) -> Result<Option<Session>>;
}

/// Deserialize a batch of rows into `T`.
pub fn rows_into<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Into::into))
        .collect()
}

/// Deserialize the first row into `T`, if there is one.
pub fn first_into<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Option<T>> {
    rows.into_iter()
        .next()
        .map(serde_json::from_value)
        .transpose()
        .map_err(Into::into)
}
