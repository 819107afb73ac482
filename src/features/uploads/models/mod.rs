mod sort;
mod storage_key;
mod upload_record;

pub use sort::{CatalogSort, SortDirection, SortField};
pub use storage_key::StorageKey;
pub use upload_record::{NewUploadRecord, UploadRecord};
