use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::UploadForm;
use crate::features::uploads::dtos::{
    DeleteUploadResponseDto, UploadFileDto, UploadRecordDto, UploadResultDto,
};
use crate::features::uploads::models::CatalogSort;
use crate::features::uploads::UploadService;
use crate::shared::constants::{MSG_DELETE_SUCCESS, MSG_UPLOAD_SUCCESS};
use crate::shared::types::{ApiResponse, Meta};

/// Upload a file
///
/// Accepts multipart/form-data with:
/// - `user_name`: name of the uploader (required, trimmed)
/// - `file`: the file (PDF, Word, Markdown, Text, Image or ZIP, at most 100MB)
#[utoipa::path(
    post,
    path = "/api/uploads",
    tag = "uploads",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "Uploader name and the file to store",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<UploadResultDto>),
        (status = 400, description = "Missing name or file, disallowed type, or file too large"),
        (status = 502, description = "Storage or database failure")
    )
)]
pub async fn upload_file(
    State(service): State<Arc<UploadService>>,
    form: UploadForm,
) -> Result<(StatusCode, Json<ApiResponse<UploadResultDto>>)> {
    let outcome = service.upload(&form.user_name, form.file).await?;

    let snapshot = outcome.snapshot;
    let message = snapshot
        .success
        .unwrap_or_else(|| MSG_UPLOAD_SUCCESS.to_string());
    let result = UploadResultDto {
        upload: UploadRecordDto::from(&outcome.record),
        state: snapshot.state.as_str().to_string(),
        progress: snapshot.progress,
        warning: snapshot.error,
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(result), Some(message), None)),
    ))
}

/// List all uploads, newest first
#[utoipa::path(
    get,
    path = "/api/uploads",
    tag = "uploads",
    responses(
        (status = 200, description = "Uploads, possibly stale with a warning message", body = ApiResponse<Vec<UploadRecordDto>>),
        (status = 502, description = "Uploads could not be loaded")
    )
)]
pub async fn list_uploads(
    State(service): State<Arc<UploadService>>,
) -> Result<Json<ApiResponse<Vec<UploadRecordDto>>>> {
    let listing = service.list(CatalogSort::default()).await?;
    let items: Vec<UploadRecordDto> = listing
        .catalog
        .records()
        .iter()
        .map(UploadRecordDto::from)
        .collect();
    let total = items.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(items),
        listing.warning,
        Some(Meta { total }),
    )))
}

/// Delete an upload and its stored file
#[utoipa::path(
    delete,
    path = "/api/uploads/{id}",
    tag = "uploads",
    params(
        ("id" = Uuid, Path, description = "Upload ID")
    ),
    responses(
        (status = 200, description = "File deleted successfully", body = ApiResponse<DeleteUploadResponseDto>),
        (status = 404, description = "Upload not found"),
        (status = 502, description = "Record could not be deleted")
    )
)]
pub async fn delete_upload(
    State(service): State<Arc<UploadService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteUploadResponseDto>>> {
    Ok(Json(delete_response(&service, id).await?))
}

pub(super) async fn delete_response(
    service: &UploadService,
    id: Uuid,
) -> Result<ApiResponse<DeleteUploadResponseDto>> {
    let outcome = service.delete(id).await?;
    let message = outcome
        .snapshot
        .success
        .unwrap_or_else(|| MSG_DELETE_SUCCESS.to_string());

    Ok(ApiResponse::success(
        Some(DeleteUploadResponseDto {
            deleted: true,
            blob_removed: outcome.removal.blob_removed,
            warning: outcome.snapshot.error,
        }),
        Some(message),
        None,
    ))
}

#[cfg(test)]
mod tests {
    use crate::features::uploads::routes;
    use crate::features::uploads::services::CatalogRepository;
    use crate::features::uploads::UploadService;
    use crate::modules::storage::BlobStore;
    use crate::shared::constants::MAX_FILE_SIZE;
    use crate::shared::test_helpers::{record, InMemoryBlobStore, InMemoryUploadTable};
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::Value;
    use std::sync::Arc;

    fn server(blobs: &InMemoryBlobStore, table: &InMemoryUploadTable) -> TestServer {
        let service = Arc::new(UploadService::new(CatalogRepository::new(
            blobs.shared(),
            table.shared(),
        )));
        let max_body = MAX_FILE_SIZE as usize + 1024 * 1024;
        TestServer::new(routes::public_routes(service, max_body)).unwrap()
    }

    fn form(user_name: &str, file_name: &str, mime: &str, bytes: &[u8]) -> MultipartForm {
        MultipartForm::new().add_text("user_name", user_name.to_string()).add_part(
            "file",
            Part::bytes(bytes.to_vec())
                .file_name(file_name.to_string())
                .mime_type(mime.to_string()),
        )
    }

    #[tokio::test]
    async fn test_upload_then_list() {
        let blobs = InMemoryBlobStore::new();
        let table = InMemoryUploadTable::new();
        let server = server(&blobs, &table);

        let response = server
            .post("/api/uploads")
            .multipart(form(" Alice ", "notes.txt", "text/plain", b"hello"))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["message"], "File uploaded successfully!");
        assert_eq!(body["data"]["progress"], 100);
        assert_eq!(body["data"]["state"], "succeeded");
        assert_eq!(body["data"]["upload"]["user_name"], "Alice");
        assert_eq!(body["data"]["upload"]["file_size"], 5);
        assert_eq!(body["data"]["upload"]["file_size_display"], "5 Bytes");
        assert_eq!(body["data"]["upload"]["category"], "text");

        let list: Value = server.get("/api/uploads").await.json();
        assert_eq!(list["meta"]["total"], 1);
        assert_eq!(list["data"][0]["file_name"], "notes.txt");
        assert_eq!(blobs.put_calls(), 1);
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_type() {
        let blobs = InMemoryBlobStore::new();
        let table = InMemoryUploadTable::new();

        let response = server(&blobs, &table)
            .post("/api/uploads")
            .multipart(form("Alice", "run.exe", "application/x-msdownload", b"MZ"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["message"],
            "Please select a valid file type (PDF, Word, Markdown, Text, Image, or ZIP)."
        );
        assert_eq!(blobs.put_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_requires_name() {
        let blobs = InMemoryBlobStore::new();
        let table = InMemoryUploadTable::new();

        let response = server(&blobs, &table)
            .post("/api/uploads")
            .multipart(form("   ", "a.pdf", "application/pdf", b"%PDF"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], "Please enter your name.");
        assert_eq!(table.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_over_body_limit_reports_size_error() {
        let blobs = InMemoryBlobStore::new();
        let table = InMemoryUploadTable::new();
        let service = Arc::new(UploadService::new(CatalogRepository::new(
            blobs.shared(),
            table.shared(),
        )));
        let server = TestServer::new(routes::public_routes(service, 4 * 1024)).unwrap();

        let response = server
            .post("/api/uploads")
            .multipart(form("Alice", "big.zip", "application/zip", &[0u8; 16 * 1024]))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["message"],
            "File size must be less than 100MB."
        );
        assert_eq!(blobs.put_calls(), 0);
        assert_eq!(table.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_storage_failure_is_bad_gateway() {
        let blobs = InMemoryBlobStore::new();
        let table = InMemoryUploadTable::new();
        blobs.fail_put(true);

        let response = server(&blobs, &table)
            .post("/api/uploads")
            .multipart(form("Alice", "a.pdf", "application/pdf", b"%PDF"))
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        let message = response.json::<Value>()["message"].as_str().unwrap().to_string();
        assert!(message.starts_with("Storage upload failed: "));
        assert_eq!(table.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_upload() {
        let blobs = InMemoryBlobStore::new();
        let table = InMemoryUploadTable::new();
        blobs.insert("5_a.pdf", b"x".to_vec());
        let mut existing = record("Alice", "a.pdf", "application/pdf", 1);
        existing.file_url = Some(blobs.public_url("5_a.pdf"));
        let existing = table.seed(existing);
        let server = server(&blobs, &table);

        let response = server.delete(&format!("/api/uploads/{}", existing.id)).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "File deleted successfully!");
        assert_eq!(body["data"]["blob_removed"], true);
        assert!(!blobs.contains("5_a.pdf"));

        let missing = server.delete(&format!("/api/uploads/{}", existing.id)).await;
        missing.assert_status(StatusCode::NOT_FOUND);
    }
}
