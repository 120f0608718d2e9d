//! Filesystem cache for rendered output.
//!
//! Rendering is deterministic, so a cache entry is keyed by a hash of the
//! entity set plus the configuration and never needs invalidation. Writes go
//! through a temp file renamed into place: one writer wins per key, readers
//! only ever see complete entries, and entries are immutable once written.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use sha2::{Digest, Sha256};

use crate::config::DiagramConfig;
use crate::schema::Entity;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache key serialization failed: {0}")]
    Key(#[from] serde_json::Error),
}

pub struct RenderCache {
    cache_dir: PathBuf,
}

impl RenderCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    /// Compute the cache key for an entity set and configuration.
    pub fn compute_key(
        entities: &[Entity],
        config: &DiagramConfig,
    ) -> Result<String, CacheError> {
        let input = serde_json::to_vec(&(entities, config))?;
        let mut hasher = Sha256::new();
        hasher.update(&input);
        let hash = hasher.finalize();
        // First 16 bytes keep filenames short
        Ok(hex::encode(&hash[..16]))
    }

    pub fn entry_path(&self, key: &str, extension: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.{}", key, extension))
    }

    pub fn get(&self, key: &str, extension: &str) -> Option<String> {
        let path = self.entry_path(key, extension);
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!("cache hit: {}", path.display());
                Some(content)
            }
            Err(_) => {
                debug!("cache miss: {}", path.display());
                None
            }
        }
    }

    pub fn put(&self, key: &str, extension: &str, content: &str) -> Result<PathBuf, CacheError> {
        let path = self.entry_path(key, extension);
        let tmp = self.cache_dir.join(format!("{}.{}.tmp", key, extension));
        fs::write(&tmp, content)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            // A concurrent writer got there first; their entry is identical
            let _ = fs::remove_file(&tmp);
            if !path.exists() {
                return Err(e.into());
            }
            warn!("cache rename lost the race for {}", path.display());
        }
        Ok(path)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}
