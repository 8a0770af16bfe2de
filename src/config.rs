use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, StorefrontError};

// Table names on the hosted backend.
pub const PRODUCTS: &str = "products";
pub const CATEGORIES: &str = "categories";
pub const ORDERS: &str = "orders";
pub const ORDER_ITEMS: &str = "order_items";
pub const REVIEWS: &str = "reviews";
pub const ADDRESSES: &str = "addresses";
pub const USERS: &str = "users";
pub const WISHLIST: &str = "wishlist";
pub const FEATURE_FLAGS: &str = "feature_flags";

/// Storage bucket holding product images.
pub const PRODUCT_IMAGES_BUCKET: &str = "product-images";

/// File name of the gzip-compressed catalog snapshot inside the cache directory.
pub const CATALOG_SNAPSHOT: &str = "catalog.json.gz";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_URL: &str = "STOREFRONT_URL";
pub const ENV_API_KEY: &str = "STOREFRONT_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "STOREFRONT_TIMEOUT_SECS";

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("storefront-sdk")
    } else {
        PathBuf::from(".storefront-sdk-cache")
    }
}

/// Connection settings for the hosted backend's REST endpoints.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Project base URL, e.g. `https://abc.example.co`.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub api_key: String,
    pub timeout: Duration,
}

impl RestConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read settings from `STOREFRONT_URL`, `STOREFRONT_API_KEY` and the
    /// optional `STOREFRONT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let url = required_var(ENV_URL)?;
        let api_key = required_var(ENV_API_KEY)?;
        let mut config = Self::new(url, api_key);

        match env::var(ENV_TIMEOUT_SECS) {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e| {
                    StorefrontError::InvalidArgument(format!("{ENV_TIMEOUT_SECS}={raw}: {e}"))
                })?;
                config.timeout = Duration::from_secs(secs);
            }
            Err(_) => {
                tracing::debug!(
                    "{ENV_TIMEOUT_SECS} not set, using default of {}s",
                    DEFAULT_TIMEOUT.as_secs()
                );
            }
        }

        Ok(config)
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path)
    }

    pub fn upload_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.url, bucket, path)
    }

    pub fn public_object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.url, bucket, path)
    }
}

fn required_var(key: &str) -> Result<String> {
    env::var(key)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StorefrontError::InvalidArgument(format!("{key} is not set")))
}
