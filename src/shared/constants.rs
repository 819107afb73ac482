/// Bucket holding every uploaded blob
pub const STORAGE_BUCKET: &str = "file-uploads";

/// Table holding one metadata row per uploaded blob
pub const UPLOADS_TABLE: &str = "file_uploads";

/// Maximum accepted file size in bytes (100 MiB, inclusive)
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// MIME types accepted for upload
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/markdown",
    "text/plain",
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/zip",
    "application/x-zip-compressed",
];

/// Check if a MIME type is allowed
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

// =============================================================================
// USER-FACING MESSAGES
// =============================================================================

pub const MSG_UPLOAD_SUCCESS: &str = "File uploaded successfully!";
pub const MSG_DELETE_SUCCESS: &str = "File deleted successfully!";
pub const MSG_LOAD_FAILED: &str = "Failed to load uploads";
pub const MSG_REFRESH_AFTER_MUTATION_FAILED: &str = "Failed to load existing uploads";
