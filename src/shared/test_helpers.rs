#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};
#[cfg(test)]
use chrono::{DateTime, Utc};
#[cfg(test)]
use fake::{faker::name::en::Name, Fake};
#[cfg(test)]
use uuid::Uuid;

#[cfg(test)]
use crate::features::auth::model::AdminSession;
#[cfg(test)]
use crate::features::uploads::models::{NewUploadRecord, SortField, UploadRecord};
#[cfg(test)]
use crate::modules::storage::{BlobStore, PublicUrlBuilder};
#[cfg(test)]
use crate::modules::table::UploadTable;
#[cfg(test)]
use crate::modules::{StoreError, StoreResult};

#[cfg(test)]
pub const TEST_STORAGE_BASE: &str = "https://storage.test";

#[cfg(test)]
pub fn record(user_name: &str, file_name: &str, file_type: &str, file_size: i64) -> UploadRecord {
    UploadRecord {
        id: Uuid::new_v4(),
        user_name: user_name.to_string(),
        file_name: file_name.to_string(),
        file_type: file_type.to_string(),
        file_size,
        file_url: None,
        uploaded_at: Utc::now(),
    }
}

#[cfg(test)]
pub fn record_at(
    user_name: &str,
    file_name: &str,
    file_size: i64,
    uploaded_at: DateTime<Utc>,
) -> UploadRecord {
    UploadRecord {
        uploaded_at,
        ..record(user_name, file_name, "application/pdf", file_size)
    }
}

#[cfg(test)]
pub fn fake_user_name() -> String {
    Name().fake::<String>()
}

// =============================================================================
// IN-MEMORY BLOB STORE
// =============================================================================

#[cfg(test)]
#[derive(Default)]
struct BlobState {
    blobs: HashMap<String, (Vec<u8>, String)>,
    fail_put: bool,
    fail_delete: bool,
    put_calls: usize,
    delete_calls: usize,
}

/// Object store double; clones share the same state
#[cfg(test)]
#[derive(Clone)]
pub struct InMemoryBlobStore {
    state: Arc<Mutex<BlobState>>,
    urls: PublicUrlBuilder,
}

#[cfg(test)]
impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BlobState::default())),
            urls: PublicUrlBuilder::new(TEST_STORAGE_BASE, TEST_STORAGE_BASE, "file-uploads"),
        }
    }

    pub fn shared(&self) -> Arc<dyn BlobStore> {
        Arc::new(self.clone())
    }

    pub fn insert(&self, key: &str, data: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .blobs
            .insert(key.to_string(), (data, "application/octet-stream".to_string()));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().unwrap().blobs.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.state.lock().unwrap().blobs.keys().cloned().collect()
    }

    pub fn content_type_of(&self, key: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .blobs
            .get(key)
            .map(|(_, content_type)| content_type.clone())
    }

    pub fn fail_put(&self, fail: bool) {
        self.state.lock().unwrap().fail_put = fail;
    }

    pub fn fail_delete(&self, fail: bool) {
        self.state.lock().unwrap().fail_delete = fail;
    }

    pub fn put_calls(&self) -> usize {
        self.state.lock().unwrap().put_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.state.lock().unwrap().delete_calls
    }
}

#[cfg(test)]
#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put_blob(&self, key: &str, data: Vec<u8>, content_type: &str) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.put_calls += 1;
        if state.fail_put {
            return Err(StoreError::Storage("bucket unavailable".to_string()));
        }
        state
            .blobs
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.urls.url_for(key)
    }

    async fn delete_blob(&self, key: &str) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls += 1;
        if state.fail_delete {
            return Err(StoreError::Storage("delete rejected".to_string()));
        }
        state.blobs.remove(key);
        Ok(())
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        self.urls.key_from(url)
    }
}

// =============================================================================
// IN-MEMORY UPLOAD TABLE
// =============================================================================

#[cfg(test)]
#[derive(Default)]
struct TableState {
    rows: Vec<UploadRecord>,
    fail_insert: bool,
    fail_select: bool,
    fail_delete: bool,
    insert_calls: usize,
    select_calls: usize,
}

/// Upload table double; clones share the same rows
#[cfg(test)]
#[derive(Clone, Default)]
pub struct InMemoryUploadTable {
    state: Arc<Mutex<TableState>>,
}

#[cfg(test)]
impl InMemoryUploadTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> Arc<dyn UploadTable> {
        Arc::new(self.clone())
    }

    pub fn seed(&self, row: UploadRecord) -> UploadRecord {
        self.state.lock().unwrap().rows.push(row.clone());
        row
    }

    pub fn rows(&self) -> Vec<UploadRecord> {
        self.state.lock().unwrap().rows.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().rows.len()
    }

    pub fn fail_insert(&self, fail: bool) {
        self.state.lock().unwrap().fail_insert = fail;
    }

    pub fn fail_select(&self, fail: bool) {
        self.state.lock().unwrap().fail_select = fail;
    }

    pub fn fail_delete(&self, fail: bool) {
        self.state.lock().unwrap().fail_delete = fail;
    }

    pub fn insert_calls(&self) -> usize {
        self.state.lock().unwrap().insert_calls
    }

    pub fn select_calls(&self) -> usize {
        self.state.lock().unwrap().select_calls
    }
}

#[cfg(test)]
#[async_trait]
impl UploadTable for InMemoryUploadTable {
    async fn insert_row(&self, row: NewUploadRecord) -> StoreResult<UploadRecord> {
        let mut state = self.state.lock().unwrap();
        state.insert_calls += 1;
        if state.fail_insert {
            return Err(StoreError::Table("insert rejected".to_string()));
        }
        let saved = UploadRecord {
            id: Uuid::new_v4(),
            user_name: row.user_name,
            file_name: row.file_name,
            file_type: row.file_type,
            file_size: row.file_size,
            file_url: row.file_url,
            uploaded_at: Utc::now(),
        };
        state.rows.push(saved.clone());
        Ok(saved)
    }

    async fn select_rows(&self, field: SortField, ascending: bool) -> StoreResult<Vec<UploadRecord>> {
        let mut state = self.state.lock().unwrap();
        state.select_calls += 1;
        if state.fail_select {
            return Err(StoreError::Table("select rejected".to_string()));
        }

        let mut rows = state.rows.clone();
        rows.sort_by(|a, b| {
            let ordering = match field {
                SortField::UploadedAt => a.uploaded_at.cmp(&b.uploaded_at),
                SortField::FileName => a.file_name.cmp(&b.file_name),
                SortField::UserName => a.user_name.cmp(&b.user_name),
                SortField::FileSize => a.file_size.cmp(&b.file_size),
            };
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
        Ok(rows)
    }

    async fn delete_row(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_delete {
            return Err(StoreError::Table("delete rejected".to_string()));
        }
        state.rows.retain(|r| r.id != id);
        Ok(())
    }
}

// =============================================================================
// ADMIN SESSION
// =============================================================================

#[cfg(test)]
pub fn create_admin_session() -> AdminSession {
    AdminSession {
        username: "test-admin".to_string(),
        authenticated_at: Utc::now(),
    }
}

#[cfg(test)]
async fn inject_admin_session_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_admin_session());
    next.run(request).await
}

#[cfg(test)]
pub fn with_admin_session(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_session_middleware))
}
