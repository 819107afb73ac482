use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::features::uploads::models::{CatalogSort, NewUploadRecord, StorageKey, UploadRecord};
use crate::modules::storage::BlobStore;
use crate::modules::table::UploadTable;
use crate::modules::StoreResult;

/// What happened to the blob when a record was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// False when the storage cleanup failed and the blob is now an orphan
    pub blob_removed: bool,
}

/// Domain operations over the blob store and the upload table
pub struct CatalogRepository {
    blobs: Arc<dyn BlobStore>,
    table: Arc<dyn UploadTable>,
}

impl CatalogRepository {
    pub fn new(blobs: Arc<dyn BlobStore>, table: Arc<dyn UploadTable>) -> Self {
        Self { blobs, table }
    }

    /// Store blob bytes under `key`
    pub async fn put_blob(&self, key: &StorageKey, data: Vec<u8>, content_type: &str) -> StoreResult<()> {
        self.blobs.put_blob(key.as_str(), data, content_type).await
    }

    pub fn public_url(&self, key: &StorageKey) -> String {
        self.blobs.public_url(key.as_str())
    }

    /// Record metadata for a blob that has already been stored
    pub async fn submit_upload(&self, record: NewUploadRecord) -> StoreResult<UploadRecord> {
        let saved = self.table.insert_row(record).await?;

        info!(
            "Upload recorded: id={}, file={}, user={}, size={}",
            saved.id, saved.file_name, saved.user_name, saved.file_size
        );
        Ok(saved)
    }

    /// Delete the record, then try to delete its blob.
    ///
    /// Only the row delete can fail the operation. A failed blob delete is
    /// logged and reported through `RemovalOutcome::blob_removed`.
    pub async fn remove_upload(&self, id: Uuid, blob_key: &str) -> StoreResult<RemovalOutcome> {
        self.table.delete_row(id).await?;
        info!("Upload record deleted: id={}", id);

        let blob_removed = match self.blobs.delete_blob(blob_key).await {
            Ok(()) => {
                debug!("Blob '{}' removed for record {}", blob_key, id);
                true
            }
            Err(e) => {
                warn!(
                    "Storage cleanup failed for record {} (blob '{}' left orphaned): {}",
                    id, blob_key, e
                );
                false
            }
        };

        Ok(RemovalOutcome { blob_removed })
    }

    /// The full catalog, ordered by the table
    pub async fn list_uploads(&self, sort: CatalogSort) -> StoreResult<Vec<UploadRecord>> {
        self.table
            .select_rows(sort.field, sort.direction.is_ascending())
            .await
    }

    /// Storage key of the blob behind `record`
    ///
    /// Derived from `file_url`; records without a resolvable URL fall back to
    /// their file name.
    pub fn blob_key_for(&self, record: &UploadRecord) -> String {
        match record
            .file_url
            .as_deref()
            .and_then(|url| self.blobs.key_from_url(url))
        {
            Some(key) => {
                if StorageKey::parse(&key).is_none() {
                    debug!("Record {} points at non-generated key '{}'", record.id, key);
                }
                key
            }
            None => {
                warn!(
                    "Record {} has no storage URL, using file name '{}' as key",
                    record.id, record.file_name
                );
                record.file_name.clone()
            }
        }
    }
}
