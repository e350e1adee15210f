//! Local filesystem storage implementation.

use async_trait::async_trait;
use log::debug;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use super::{Storage, StorageError, StorageResult};

/// Local filesystem storage implementation.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    /// Base directory for storage.
    base_path: PathBuf,
    /// URL prefix the base directory is served under.
    public_base_url: String,
}

impl LocalStorage {
    /// Create a new local storage instance.
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// Get the full path for a key, rejecting keys that leave the base directory.
    fn full_path(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));

        if key.trim().is_empty() || !is_plain {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn write(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        let full_path = self.full_path(key)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&full_path, data).await?;
        debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }
}
