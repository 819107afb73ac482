mod catalog_repository;
mod catalog_view;
mod upload_workflow;

pub use catalog_repository::{CatalogRepository, RemovalOutcome};
pub use catalog_view::{
    Catalog, CatalogFilter, CatalogState, CatalogStats, RefreshOutcome, Refreshed,
};
pub use upload_workflow::{
    validate_candidate, CandidateFile, SelectedFile, UploadError, UploadSnapshot, UploadStage,
    UploadState, UploadWorkflow,
};

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::uploads::models::{CatalogSort, UploadRecord};
use crate::modules::StoreError;
use crate::shared::constants::MSG_LOAD_FAILED;

/// Catalog returned to a caller, possibly stale
pub struct CatalogListing {
    pub catalog: Arc<Catalog>,
    /// Set when the refresh failed and the previous list was served instead
    pub warning: Option<String>,
}

/// Outcome of a finished upload
pub struct UploadOutcome {
    pub record: UploadRecord,
    pub snapshot: UploadSnapshot,
}

/// Outcome of a finished delete
pub struct DeleteOutcome {
    pub removal: RemovalOutcome,
    pub snapshot: UploadSnapshot,
}

/// Entry point used by the HTTP handlers
pub struct UploadService {
    repository: Arc<CatalogRepository>,
    catalog: Arc<CatalogState>,
}

impl UploadService {
    pub fn new(repository: CatalogRepository) -> Self {
        Self {
            repository: Arc::new(repository),
            catalog: Arc::new(CatalogState::new()),
        }
    }

    /// A fresh workflow sharing this service's catalog
    pub fn workflow(&self) -> UploadWorkflow {
        UploadWorkflow::new(Arc::clone(&self.repository), Arc::clone(&self.catalog))
    }

    /// Select `file` (if any) and submit it under `user_name`
    pub async fn upload(&self, user_name: &str, file: Option<CandidateFile>) -> Result<UploadOutcome> {
        let mut workflow = self.workflow();
        if let Some(file) = file {
            workflow.select_file(file)?;
        }
        if let Some(selected) = workflow.snapshot().selected_file {
            info!(
                "Uploading '{}' ({}, {} bytes)",
                selected.name, selected.content_type, selected.size
            );
        }
        let record = workflow.submit(user_name).await?;

        Ok(UploadOutcome {
            record,
            snapshot: workflow.snapshot(),
        })
    }

    /// Refetch the catalog in `sort` order.
    ///
    /// The answer is always the list this call fetched, even when a newer
    /// refresh has become current meanwhile. When the refetch fails the last
    /// good list is served with a warning. Without one the failure is returned.
    pub async fn list(&self, sort: CatalogSort) -> Result<CatalogListing> {
        match self.catalog.refresh(&self.repository, sort).await {
            Ok(Refreshed { catalog, outcome }) => {
                debug!(
                    "Catalog refresh for {:?}: {:?} ({} records)",
                    sort,
                    outcome,
                    catalog.len()
                );
                Ok(CatalogListing {
                    catalog,
                    warning: None,
                })
            }
            Err(e) if self.catalog.is_loaded().await => {
                warn!("Catalog refresh failed, serving previous list: {}", e);
                Ok(CatalogListing {
                    catalog: self.catalog.snapshot().await,
                    warning: Some(MSG_LOAD_FAILED.to_string()),
                })
            }
            Err(e) => {
                warn!("Catalog refresh failed with nothing loaded: {}", e);
                Err(load_failed(&e))
            }
        }
    }

    /// Delete the upload `id` and its blob
    pub async fn delete(&self, id: Uuid) -> Result<DeleteOutcome> {
        let record = self.find(id).await?;
        let blob_key = self.repository.blob_key_for(&record);

        let mut workflow = self.workflow();
        let removal = workflow.remove(id, &blob_key).await?;

        Ok(DeleteOutcome {
            removal,
            snapshot: workflow.snapshot(),
        })
    }

    /// Look `id` up in the held catalog, refetching once on a miss
    async fn find(&self, id: Uuid) -> Result<UploadRecord> {
        if let Some(record) = self.catalog.snapshot().await.find(id) {
            return Ok(record.clone());
        }

        let sort = self.catalog.sort().await;
        let refreshed = self
            .catalog
            .refresh(&self.repository, sort)
            .await
            .map_err(|e| load_failed(&e))?;

        refreshed
            .catalog
            .find(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Upload with id {} not found", id)))
    }
}

fn load_failed(err: &StoreError) -> AppError {
    AppError::ExternalServiceError(format!("{}: {}", MSG_LOAD_FAILED, err.detail()))
}
