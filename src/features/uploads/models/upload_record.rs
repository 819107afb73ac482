use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for one uploaded file
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UploadRecord {
    pub id: Uuid,
    pub user_name: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    /// Public address of the blob; absent when it could not be resolved
    pub file_url: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Row values supplied by the client; `id` and `uploaded_at` come from the table
#[derive(Debug, Clone, PartialEq)]
pub struct NewUploadRecord {
    pub user_name: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub file_url: Option<String>,
}
