//! Async wrapper around [`Storefront`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all storefront operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free while
//! the blocking HTTP client talks to the backend.
//!
//! # Example
//!
//! ```no_run
//! use storefront_sdk::{AsyncStorefront, RestConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let shop = AsyncStorefront::builder()
//!         .rest(RestConfig::new("https://project.example.co", "public-anon-key"))
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     // Run any sync storefront method via closure
//!     let featured = shop.run(|s| {
//!         Ok(s.catalog().all().iter().filter(|p| p.is_featured).count())
//!     }).await.unwrap();
//!
//!     let total = shop.cart_amount().await.unwrap();
//! }
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rust_decimal::Decimal;

use crate::backend::Backend;
use crate::config::RestConfig;
use crate::error::{Result, StorefrontError};
use crate::models::{AddressId, Order};
use crate::{Storefront, StorefrontBuilder};

fn join_error(e: tokio::task::JoinError) -> StorefrontError {
    StorefrontError::InvalidArgument(format!("Task join error: {e}"))
}

fn poisoned() -> StorefrontError {
    StorefrontError::InvalidArgument("storefront lock poisoned".into())
}

// ---------------------------------------------------------------------------
// AsyncStorefrontBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncStorefront`].
///
/// Accepts the same settings as [`StorefrontBuilder`].
#[derive(Default)]
pub struct AsyncStorefrontBuilder {
    inner: StorefrontBuilder,
}

impl AsyncStorefrontBuilder {
    pub fn backend<B: Backend + 'static>(mut self, backend: B) -> Self {
        self.inner = self.inner.backend(backend);
        self
    }

    pub fn rest(mut self, config: RestConfig) -> Self {
        self.inner = self.inner.rest(config);
        self
    }

    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.inner = self.inner.cache_dir(path);
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.inner = self.inner.offline(offline);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }

    pub fn sync_on_build(mut self, sync: bool) -> Self {
        self.inner = self.inner.sync_on_build(sync);
        self
    }

    /// Build the storefront, including the initial sync, on the blocking
    /// thread pool.
    pub async fn build(self) -> Result<AsyncStorefront> {
        let builder = self.inner;
        tokio::task::spawn_blocking(move || {
            let storefront = builder.build()?;
            Ok(AsyncStorefront {
                inner: Arc::new(Mutex::new(storefront)),
            })
        })
        .await
        .map_err(join_error)?
    }
}

// ---------------------------------------------------------------------------
// AsyncStorefront
// ---------------------------------------------------------------------------

/// Async wrapper around [`Storefront`].
///
/// The storefront sits behind a [`Mutex`], so operations from concurrent
/// tasks are serialized. Cloning is cheap and shares the same state.
///
/// # Usage
///
/// Use [`run()`](Self::run) to execute any sync storefront method:
///
/// ```no_run
/// # use storefront_sdk::AsyncStorefront;
/// # async fn example() -> storefront_sdk::Result<()> {
/// let shop = AsyncStorefront::builder().build().await?;
/// let categories = shop.run(|s| s.categories().list()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AsyncStorefront {
    inner: Arc<Mutex<Storefront>>,
}

impl AsyncStorefront {
    pub fn builder() -> AsyncStorefrontBuilder {
        AsyncStorefrontBuilder::default()
    }

    /// Run a sync storefront operation on the blocking thread pool.
    ///
    /// The closure receives `&mut Storefront` and returns a `Result<T>`.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Storefront) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let storefront = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = storefront.lock().map_err(|_| poisoned())?;
            f(&mut guard)
        })
        .await
        .map_err(join_error)?
    }

    /// Refresh the cached catalog. See [`Storefront::fetch_products`].
    pub async fn fetch_products(&self) -> Result<usize> {
        self.run(|s| s.fetch_products()).await
    }

    pub async fn sync(&self) -> Result<()> {
        self.run(|s| s.sync()).await
    }

    pub async fn cart_count(&self) -> Result<u64> {
        self.run(|s| Ok(s.cart_count())).await
    }

    pub async fn cart_amount(&self) -> Result<Decimal> {
        self.run(|s| Ok(s.cart_amount())).await
    }

    pub async fn place_order(&self, address_id: AddressId) -> Result<Order> {
        self.run(move |s| s.place_order(address_id)).await
    }

    /// Close the storefront, releasing the backend client.
    ///
    /// If other clones are still alive the state stays with them and only
    /// this handle is dropped.
    pub async fn close(self) -> Result<()> {
        tokio::task::spawn_blocking(move || {
            if let Ok(mutex) = Arc::try_unwrap(self.inner) {
                mutex.into_inner().map_err(|_| poisoned())?.close();
            }
            Ok(())
        })
        .await
        .map_err(join_error)?
    }
}
