use async_trait::async_trait;
use uuid::Uuid;

use crate::features::uploads::models::{NewUploadRecord, SortField, UploadRecord};
use crate::modules::StoreResult;

/// Relational contract for the `file_uploads` table
///
/// One remote call per operation, no batching.
#[async_trait]
pub trait UploadTable: Send + Sync {
    /// Insert one row; the table assigns `id` and `uploaded_at`
    async fn insert_row(&self, record: NewUploadRecord) -> StoreResult<UploadRecord>;

    /// All rows ordered by `field`
    async fn select_rows(&self, field: SortField, ascending: bool)
        -> StoreResult<Vec<UploadRecord>>;

    /// Delete the row with `id`; deleting a missing row is not an error
    async fn delete_row(&self, id: Uuid) -> StoreResult<()>;
}
