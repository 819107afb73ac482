use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::uploads::models::{CatalogSort, SortDirection, SortField, UploadRecord};
use crate::features::uploads::services::{CatalogFilter, CatalogStats};
use crate::shared::format::{format_size, format_uploaded_at, FileCategory};

/// Upload form for OpenAPI documentation.
/// The handler reads the multipart body directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// Name of the person uploading
    #[schema(example = "Alice")]
    pub user_name: String,
    /// The file to upload (PDF, Word, Markdown, Text, Image or ZIP, at most 100MB)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// One uploaded file as shown in listings
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadRecordDto {
    pub id: Uuid,
    pub user_name: String,
    pub file_name: String,
    /// MIME type
    pub file_type: String,
    /// Size in bytes
    pub file_size: i64,
    /// Size for display, e.g. "1.5 KB"
    pub file_size_display: String,
    pub category: FileCategory,
    /// Public address of the file
    pub file_url: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    /// Upload time in server-local time, e.g. "Jan 5, 2025, 02:30 PM"
    pub uploaded_at_display: String,
}

impl From<&UploadRecord> for UploadRecordDto {
    fn from(record: &UploadRecord) -> Self {
        Self {
            id: record.id,
            user_name: record.user_name.clone(),
            file_name: record.file_name.clone(),
            file_type: record.file_type.clone(),
            file_size: record.file_size,
            file_size_display: format_size(u64::try_from(record.file_size).unwrap_or(0)),
            category: FileCategory::for_mime(&record.file_type),
            file_url: record.file_url.clone(),
            uploaded_at: record.uploaded_at,
            uploaded_at_display: format_uploaded_at(record.uploaded_at, &Local),
        }
    }
}

/// Result of a finished upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResultDto {
    pub upload: UploadRecordDto,
    /// Workflow state after the upload, `succeeded`
    pub state: String,
    /// Always 100 for a finished upload
    pub progress: u8,
    /// Set when the upload succeeded but the list could not be reloaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Result of a delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteUploadResponseDto {
    pub deleted: bool,
    /// False when the stored file could not be removed
    pub blob_removed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Query parameters for the admin listing
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
pub struct ListUploadsQuery {
    /// Case-insensitive match on file name or user name
    #[validate(length(max = 255, message = "search must be at most 255 characters"))]
    pub search: Option<String>,
    /// Case-insensitive match on user name
    #[validate(length(max = 255, message = "user must be at most 255 characters"))]
    pub user: Option<String>,
    /// Sort column (default: uploaded_at)
    #[serde(default)]
    pub sort_by: SortField,
    /// Sort direction (default: desc)
    #[serde(default)]
    pub sort: SortDirection,
}

impl ListUploadsQuery {
    pub fn catalog_sort(&self) -> CatalogSort {
        CatalogSort::new(self.sort_by, self.sort)
    }

    pub fn filter(&self) -> CatalogFilter {
        CatalogFilter {
            search: self.search.clone().unwrap_or_default(),
            user: self.user.clone().unwrap_or_default(),
        }
    }
}

/// Admin dashboard figures
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogStatsDto {
    pub total_files: usize,
    pub total_size_bytes: u64,
    /// Total size for display, e.g. "12.5 MB"
    pub total_size_display: String,
    pub unique_user_count: usize,
    /// Uploads whose timestamp falls on today's local date
    pub today_upload_count: usize,
}

impl From<CatalogStats> for CatalogStatsDto {
    fn from(stats: CatalogStats) -> Self {
        Self {
            total_files: stats.total_files,
            total_size_bytes: stats.total_size_bytes,
            total_size_display: format_size(stats.total_size_bytes),
            unique_user_count: stats.unique_user_count,
            today_upload_count: stats.today_upload_count,
        }
    }
}
