//! On-disk snapshot of the last successfully fetched catalog.
//!
//! Every successful fetch writes the catalog as gzip-compressed JSON. In
//! offline mode the storefront reads this snapshot instead of calling the
//! backend, so the catalog can still be browsed without a connection.

use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{Result, StorefrontError};
use crate::models::Product;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    saved_at: DateTime<Utc>,
    products: Vec<Product>,
}

/// Reads and writes the catalog snapshot in a cache directory.
pub struct CatalogCache {
    /// Directory where the snapshot is stored.
    pub cache_dir: PathBuf,
    /// If true, the storefront serves the catalog from the snapshot only.
    pub offline: bool,
}

impl CatalogCache {
    /// Create a cache rooted at `cache_dir`.
    ///
    /// If `cache_dir` is `None`, uses the platform-appropriate default cache
    /// directory. Creates the directory if it does not exist.
    pub fn new(cache_dir: Option<PathBuf>, offline: bool) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            cache_dir: dir,
            offline,
        })
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.cache_dir.join(config::CATALOG_SNAPSHOT)
    }

    /// Write the catalog snapshot.
    ///
    /// Writes to a temp file first and renames on success, so an interrupted
    /// write never leaves a corrupt snapshot behind.
    pub fn save(&self, products: &[Product]) -> Result<()> {
        let dest = self.snapshot_path();
        let tmp_dest = dest.with_extension("gz.tmp");

        let result = write_snapshot(&tmp_dest, products).and_then(|()| {
            fs::rename(&tmp_dest, &dest)?;
            Ok(())
        });

        if result.is_err() {
            let _ = fs::remove_file(&tmp_dest);
        }

        result
    }

    /// Load the catalog snapshot.
    ///
    /// A corrupt snapshot is deleted so the next online fetch replaces it.
    pub fn load(&self) -> Result<Vec<Product>> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Err(StorefrontError::NotFound(
                "no cached catalog snapshot; fetch once while online".to_string(),
            ));
        }

        match read_snapshot(&path) {
            Ok(snapshot) => {
                tracing::debug!(
                    products = snapshot.products.len(),
                    saved_at = %snapshot.saved_at,
                    "loaded catalog snapshot"
                );
                Ok(snapshot.products)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt catalog snapshot, removing");
                let _ = fs::remove_file(&path);
                Err(StorefrontError::NotFound(format!(
                    "catalog snapshot was corrupt and has been removed: {e}"
                )))
            }
        }
    }

    /// Time since the snapshot was last written, if there is one.
    pub fn age(&self) -> Option<Duration> {
        let modified = fs::metadata(self.snapshot_path()).ok()?.modified().ok()?;
        SystemTime::now().duration_since(modified).ok()
    }

    /// True if there is no snapshot or it is older than `max_age`.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.age().map_or(true, |age| age > max_age)
    }

    /// Remove all cached files and recreate the cache directory.
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }
}

fn write_snapshot(path: &Path, products: &[Product]) -> Result<()> {
    let snapshot = Snapshot {
        saved_at: Utc::now(),
        products: products.to_vec(),
    };
    let file = fs::File::create(path)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    serde_json::to_writer(&mut encoder, &snapshot)?;
    encoder.finish()?.flush()?;
    Ok(())
}

fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let file = fs::File::open(path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut contents = String::new();
    decoder.read_to_string(&mut contents)?;
    Ok(serde_json::from_str(&contents)?)
}
