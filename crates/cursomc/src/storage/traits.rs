//! Storage trait definitions.

use async_trait::async_trait;

use super::StorageResult;

/// Object storage for uploaded media.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write an object, replacing any previous contents.
    async fn write(&self, key: &str, data: &[u8]) -> StorageResult<()>;

    /// URL under which clients can fetch the object.
    fn public_url(&self, key: &str) -> String;
}
