use async_trait::async_trait;

use crate::modules::StoreResult;

/// Object store contract used by the upload workflow
///
/// Every async method issues exactly one remote call. There are no retries
/// and no timeouts beyond the transport's own.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key` with the given content type
    async fn put_blob(&self, key: &str, data: Vec<u8>, content_type: &str) -> StoreResult<()>;

    /// Public address of the blob stored under `key`
    ///
    /// Built locally from the configured base; never fails.
    fn public_url(&self, key: &str) -> String;

    /// Remove the blob stored under `key`
    ///
    /// Removing a key that does not exist is not an error.
    async fn delete_blob(&self, key: &str) -> StoreResult<()>;

    /// Recover the storage key from an address produced by `public_url`
    fn key_from_url(&self, url: &str) -> Option<String>;
}
