//! One upload attempt as a state machine.
//!
//! Intents come in through `select_file`, `submit` and `remove`; every state
//! change is published as an `UploadSnapshot` on a watch channel. Validation
//! failures never reach the network. Remote failures are wrapped into a single
//! readable message that replaces whatever error was shown before.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::uploads::models::{NewUploadRecord, StorageKey, UploadRecord};
use crate::features::uploads::services::{CatalogRepository, CatalogState, RemovalOutcome};
use crate::shared::constants::{
    is_mime_type_allowed, MAX_FILE_SIZE, MSG_DELETE_SUCCESS, MSG_REFRESH_AFTER_MUTATION_FAILED,
    MSG_UPLOAD_SUCCESS,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Please select a valid file type (PDF, Word, Markdown, Text, Image, or ZIP).")]
    InvalidFileType,

    #[error("File size must be less than 100MB.")]
    FileTooLarge,

    #[error("Please enter your name.")]
    MissingUserName,

    #[error("Please select a file to upload.")]
    NoFileSelected,

    #[error("Storage upload failed: {0}")]
    StorageFailed(String),

    #[error("Failed to save file record: {0}")]
    RecordFailed(String),

    #[error("Failed to delete file record: {0}")]
    DeleteFailed(String),
}

impl UploadError {
    /// True for errors raised before any remote call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            UploadError::InvalidFileType
                | UploadError::FileTooLarge
                | UploadError::MissingUserName
                | UploadError::NoFileSelected
        )
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        if err.is_validation() {
            AppError::Validation(err.to_string())
        } else {
            AppError::ExternalServiceError(err.to_string())
        }
    }
}

/// A file picked by the user, held in memory until submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    pub fn from_bytes(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }
}

/// Check type first, then size. The limit is inclusive.
pub fn validate_candidate(content_type: &str, size: u64) -> Result<(), UploadError> {
    if !is_mime_type_allowed(content_type) {
        return Err(UploadError::InvalidFileType);
    }
    if size > MAX_FILE_SIZE {
        return Err(UploadError::FileTooLarge);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Blob,
    Metadata,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    Idle,
    FileSelected,
    Validating,
    Uploading(UploadStage),
    Succeeded,
    Failed,
}

impl UploadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadState::Idle => "idle",
            UploadState::FileSelected => "file_selected",
            UploadState::Validating => "validating",
            UploadState::Uploading(UploadStage::Blob) => "uploading_blob",
            UploadState::Uploading(UploadStage::Metadata) => "uploading_metadata",
            UploadState::Succeeded => "succeeded",
            UploadState::Failed => "failed",
        }
    }
}

/// The selected file without its contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSnapshot {
    pub state: UploadState,
    /// Coarse progress: 0, 50, 75, 100
    pub progress: u8,
    pub selected_file: Option<SelectedFile>,
    pub error: Option<String>,
    pub success: Option<String>,
}

pub struct UploadWorkflow {
    repository: Arc<CatalogRepository>,
    catalog: Arc<CatalogState>,
    selected: Option<CandidateFile>,
    snapshots: watch::Sender<UploadSnapshot>,
}

impl UploadWorkflow {
    pub fn new(repository: Arc<CatalogRepository>, catalog: Arc<CatalogState>) -> Self {
        let (snapshots, _) = watch::channel(UploadSnapshot::default());
        Self {
            repository,
            catalog,
            selected: None,
            snapshots,
        }
    }

    pub fn snapshot(&self) -> UploadSnapshot {
        self.snapshots.borrow().clone()
    }

    fn publish(&self, update: impl FnOnce(&mut UploadSnapshot)) {
        self.snapshots.send_modify(update);
    }

    fn transition(&self, state: UploadState, progress: u8) {
        debug!("Upload workflow: {:?} ({}%)", state, progress);
        self.publish(|s| {
            s.state = state;
            s.progress = progress;
        });
    }

    fn fail(&self, err: UploadError) -> UploadError {
        warn!("Upload failed: {}", err);
        self.publish(|s| {
            s.state = UploadState::Failed;
            s.error = Some(err.to_string());
            s.success = None;
        });
        err
    }

    fn reject(&self, err: UploadError) -> UploadError {
        debug!("Upload intent rejected: {}", err);
        self.publish(|s| {
            s.error = Some(err.to_string());
            s.success = None;
        });
        err
    }

    /// Validate and hold `file`. An invalid file leaves the previous
    /// selection in place.
    pub fn select_file(&mut self, file: CandidateFile) -> Result<(), UploadError> {
        if let Err(e) = validate_candidate(&file.content_type, file.size) {
            return Err(self.reject(e));
        }

        let selected = SelectedFile {
            name: file.name.clone(),
            content_type: file.content_type.clone(),
            size: file.size,
        };
        self.selected = Some(file);
        self.publish(|s| {
            s.state = UploadState::FileSelected;
            s.progress = 0;
            s.selected_file = Some(selected);
            s.error = None;
            s.success = None;
        });
        Ok(())
    }

    /// Store the selected file, then record it, then refresh the catalog
    pub async fn submit(&mut self, user_name: &str) -> Result<UploadRecord, UploadError> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(self.reject(UploadError::MissingUserName));
        }
        let Some(file) = self.selected.as_ref() else {
            return Err(self.reject(UploadError::NoFileSelected));
        };

        self.publish(|s| {
            s.error = None;
            s.success = None;
        });
        self.transition(UploadState::Validating, 0);
        let file_size = match validate_candidate(&file.content_type, file.size)
            .and_then(|_| i64::try_from(file.size).map_err(|_| UploadError::FileTooLarge))
        {
            Ok(size) => size,
            Err(e) => return Err(self.fail(e)),
        };

        let key = StorageKey::generate(&file.name);
        self.transition(UploadState::Uploading(UploadStage::Blob), 0);
        if let Err(e) = self
            .repository
            .put_blob(&key, file.bytes.clone(), &file.content_type)
            .await
        {
            return Err(self.fail(UploadError::StorageFailed(e.detail())));
        }
        self.transition(UploadState::Uploading(UploadStage::Blob), 50);

        let file_url = self.repository.public_url(&key);
        self.transition(UploadState::Uploading(UploadStage::Metadata), 75);

        let new_record = NewUploadRecord {
            user_name: user_name.to_string(),
            file_name: file.name.clone(),
            file_type: file.content_type.clone(),
            file_size,
            file_url: Some(file_url),
        };
        let saved = match self.repository.submit_upload(new_record).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Blob '{}' stored without a record", key);
                return Err(self.fail(UploadError::RecordFailed(e.detail())));
            }
        };

        info!("File '{}' uploaded by '{}' as '{}'", saved.file_name, saved.user_name, key);
        self.selected = None;
        self.publish(|s| {
            s.state = UploadState::Succeeded;
            s.progress = 100;
            s.selected_file = None;
            s.success = Some(MSG_UPLOAD_SUCCESS.to_string());
        });

        self.refresh_after_mutation().await;
        Ok(saved)
    }

    /// Delete the record, then its blob (best effort), then refresh
    pub async fn remove(&mut self, id: Uuid, blob_key: &str) -> Result<RemovalOutcome, UploadError> {
        let outcome = match self.repository.remove_upload(id, blob_key).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.reject(UploadError::DeleteFailed(e.detail()))),
        };

        self.publish(|s| {
            s.error = None;
            s.success = Some(MSG_DELETE_SUCCESS.to_string());
        });

        self.refresh_after_mutation().await;
        Ok(outcome)
    }

    async fn refresh_after_mutation(&self) {
        let sort = self.catalog.sort().await;
        if let Err(e) = self.catalog.refresh(&self.repository, sort).await {
            warn!("Catalog refresh after mutation failed: {}", e);
            self.publish(|s| s.error = Some(MSG_REFRESH_AFTER_MUTATION_FAILED.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::BlobStore;
    use crate::shared::test_helpers::{
        fake_user_name, record, InMemoryBlobStore, InMemoryUploadTable,
    };
    use tokio_test::{assert_err, assert_ok};

    struct Harness {
        blobs: InMemoryBlobStore,
        table: InMemoryUploadTable,
        catalog: Arc<CatalogState>,
        workflow: UploadWorkflow,
    }

    fn harness() -> Harness {
        let blobs = InMemoryBlobStore::new();
        let table = InMemoryUploadTable::new();
        let repository = Arc::new(CatalogRepository::new(blobs.shared(), table.shared()));
        let catalog = Arc::new(CatalogState::new());
        let workflow = UploadWorkflow::new(repository, Arc::clone(&catalog));
        Harness {
            blobs,
            table,
            catalog,
            workflow,
        }
    }

    fn pdf(name: &str) -> CandidateFile {
        CandidateFile::from_bytes(name, "application/pdf", b"%PDF-1.7".to_vec())
    }

    #[test]
    fn test_validate_candidate_limits() {
        assert_ok!(validate_candidate("image/png", MAX_FILE_SIZE));
        assert_eq!(
            validate_candidate("image/png", MAX_FILE_SIZE + 1),
            Err(UploadError::FileTooLarge)
        );
        assert_eq!(
            validate_candidate("application/x-msdownload", 10),
            Err(UploadError::InvalidFileType)
        );
        // type is checked before size
        assert_eq!(
            validate_candidate("video/mp4", MAX_FILE_SIZE + 1),
            Err(UploadError::InvalidFileType)
        );
    }

    #[test]
    fn test_select_disallowed_type_keeps_nothing_selected() {
        let mut h = harness();
        let exe = CandidateFile::from_bytes("setup.exe", "application/x-msdownload", vec![0; 4]);

        assert_eq!(h.workflow.select_file(exe), Err(UploadError::InvalidFileType));

        let snapshot = h.workflow.snapshot();
        assert_eq!(snapshot.state, UploadState::Idle);
        assert!(snapshot.selected_file.is_none());
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Please select a valid file type (PDF, Word, Markdown, Text, Image, or ZIP).")
        );
    }

    #[test]
    fn test_select_oversized_file_keeps_previous_selection() {
        let mut h = harness();
        assert_ok!(h.workflow.select_file(pdf("first.pdf")));

        let huge = CandidateFile {
            name: "huge.zip".to_string(),
            content_type: "application/zip".to_string(),
            size: MAX_FILE_SIZE + 1,
            bytes: Vec::new(),
        };
        assert_eq!(h.workflow.select_file(huge), Err(UploadError::FileTooLarge));

        let snapshot = h.workflow.snapshot();
        assert_eq!(snapshot.state, UploadState::FileSelected);
        assert_eq!(snapshot.selected_file.unwrap().name, "first.pdf");
        assert_eq!(snapshot.error.as_deref(), Some("File size must be less than 100MB."));
    }

    #[test]
    fn test_valid_selection_clears_messages() {
        let mut h = harness();
        let exe = CandidateFile::from_bytes("a.exe", "application/x-msdownload", vec![]);
        assert_err!(h.workflow.select_file(exe));
        assert_ok!(h.workflow.select_file(pdf("ok.pdf")));

        let snapshot = h.workflow.snapshot();
        assert_eq!(snapshot.state, UploadState::FileSelected);
        assert!(snapshot.error.is_none());
        assert!(snapshot.success.is_none());
    }

    #[tokio::test]
    async fn test_blank_user_name_makes_no_remote_call() {
        let mut h = harness();
        assert_ok!(h.workflow.select_file(pdf("a.pdf")));

        for name in ["", "   "] {
            assert_eq!(h.workflow.submit(name).await, Err(UploadError::MissingUserName));
        }

        assert_eq!(h.blobs.put_calls(), 0);
        assert_eq!(h.table.insert_calls(), 0);
        let snapshot = h.workflow.snapshot();
        assert_eq!(snapshot.state, UploadState::FileSelected);
        assert_eq!(snapshot.error.as_deref(), Some("Please enter your name."));
    }

    #[tokio::test]
    async fn test_submit_without_file_is_rejected() {
        let mut h = harness();

        assert_eq!(h.workflow.submit("Alice").await, Err(UploadError::NoFileSelected));
        assert_eq!(h.blobs.put_calls(), 0);
        assert_eq!(h.workflow.snapshot().state, UploadState::Idle);
    }

    #[tokio::test]
    async fn test_blob_failure_skips_record() {
        let mut h = harness();
        h.blobs.fail_put(true);
        assert_ok!(h.workflow.select_file(pdf("a.pdf")));

        let err = assert_err!(h.workflow.submit("Alice").await);

        assert!(matches!(err, UploadError::StorageFailed(_)));
        assert_eq!(h.table.insert_calls(), 0);
        let snapshot = h.workflow.snapshot();
        assert_eq!(snapshot.state, UploadState::Failed);
        assert!(snapshot.error.unwrap().starts_with("Storage upload failed: "));
    }

    #[tokio::test]
    async fn test_record_failure_leaves_orphan_blob() {
        let mut h = harness();
        h.table.fail_insert(true);
        assert_ok!(h.workflow.select_file(pdf("a.pdf")));

        let err = assert_err!(h.workflow.submit("Alice").await);

        assert!(matches!(err, UploadError::RecordFailed(_)));
        assert_eq!(h.blobs.keys().len(), 1);
        assert_eq!(h.table.len(), 0);
        let snapshot = h.workflow.snapshot();
        assert_eq!(snapshot.state, UploadState::Failed);
        assert_eq!(snapshot.progress, 75);
        assert!(snapshot.error.unwrap().starts_with("Failed to save file record: "));
    }

    #[tokio::test]
    async fn test_successful_upload_round_trip() {
        let mut h = harness();
        let user = fake_user_name();
        assert_ok!(h.workflow.select_file(pdf("Q1 Report.pdf")));

        let saved = assert_ok!(h.workflow.submit(&format!("  {}  ", user)).await);

        assert_eq!(saved.user_name, user);
        assert_eq!(saved.file_name, "Q1 Report.pdf");
        assert_eq!(saved.file_type, "application/pdf");
        assert_eq!(saved.file_size, 8);

        let key = h.blobs.keys().pop().unwrap();
        assert!(key.ends_with("_Q1 Report.pdf"));
        assert_eq!(h.blobs.content_type_of(&key).as_deref(), Some("application/pdf"));
        assert_eq!(saved.file_url, Some(h.blobs.public_url(&key)));

        let catalog = h.catalog.snapshot().await;
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records()[0], saved);

        let snapshot = h.workflow.snapshot();
        assert_eq!(snapshot.state, UploadState::Succeeded);
        assert_eq!(snapshot.progress, 100);
        assert_eq!(snapshot.success.as_deref(), Some("File uploaded successfully!"));
        assert!(snapshot.error.is_none());
        assert!(snapshot.selected_file.is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_does_not_fail_upload() {
        let mut h = harness();
        h.table.fail_select(true);
        assert_ok!(h.workflow.select_file(pdf("a.pdf")));

        assert_ok!(h.workflow.submit("Alice").await);

        let snapshot = h.workflow.snapshot();
        assert_eq!(snapshot.state, UploadState::Succeeded);
        assert_eq!(snapshot.error.as_deref(), Some("Failed to load existing uploads"));
        assert_eq!(h.table.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_succeeds_when_blob_delete_fails() {
        let mut h = harness();
        h.blobs.insert("1_a.pdf", b"x".to_vec());
        let existing = h.table.seed(record("Alice", "a.pdf", "application/pdf", 1));
        h.blobs.fail_delete(true);

        let outcome = assert_ok!(h.workflow.remove(existing.id, "1_a.pdf").await);

        assert!(!outcome.blob_removed);
        assert_eq!(
            h.workflow.snapshot().success.as_deref(),
            Some("File deleted successfully!")
        );
        assert!(h.catalog.snapshot().await.find(existing.id).is_none());
    }

    #[tokio::test]
    async fn test_remove_row_failure_reports_message() {
        let mut h = harness();
        h.blobs.insert("1_a.pdf", b"x".to_vec());
        let existing = h.table.seed(record("Alice", "a.pdf", "application/pdf", 1));
        h.table.fail_delete(true);

        let err = assert_err!(h.workflow.remove(existing.id, "1_a.pdf").await);

        assert!(matches!(err, UploadError::DeleteFailed(_)));
        assert!(h.blobs.contains("1_a.pdf"));
        assert!(h
            .workflow
            .snapshot()
            .error
            .unwrap()
            .starts_with("Failed to delete file record: "));
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            AppError::from(UploadError::MissingUserName),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(UploadError::StorageFailed("down".to_string())),
            AppError::ExternalServiceError(_)
        ));
    }
}
