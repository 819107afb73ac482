use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::guards::RequireAdmin;
use crate::features::uploads::dtos::{
    CatalogStatsDto, DeleteUploadResponseDto, ListUploadsQuery, UploadRecordDto,
};
use crate::features::uploads::models::CatalogSort;
use crate::features::uploads::UploadService;
use crate::shared::types::{ApiResponse, Meta};

use super::upload_handlers::delete_response;

/// Search, filter and sort uploads
#[utoipa::path(
    get,
    path = "/api/admin/uploads",
    params(ListUploadsQuery),
    responses(
        (status = 200, description = "Matching uploads; meta.total counts the matches", body = ApiResponse<Vec<UploadRecordDto>>),
        (status = 400, description = "Invalid query"),
        (status = 401, description = "Admin authentication required"),
        (status = 502, description = "Uploads could not be loaded")
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn list_uploads(
    RequireAdmin(_session): RequireAdmin,
    State(service): State<Arc<UploadService>>,
    Query(params): Query<ListUploadsQuery>,
) -> Result<Json<ApiResponse<Vec<UploadRecordDto>>>> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let listing = service.list(params.catalog_sort()).await?;
    let items: Vec<UploadRecordDto> = listing
        .catalog
        .query(&params.filter())
        .into_iter()
        .map(UploadRecordDto::from)
        .collect();
    let total = items.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(items),
        listing.warning,
        Some(Meta { total }),
    )))
}

/// Distinct uploader names, in first-seen order
#[utoipa::path(
    get,
    path = "/api/admin/uploads/users",
    responses(
        (status = 200, description = "Uploader names", body = ApiResponse<Vec<String>>),
        (status = 401, description = "Admin authentication required"),
        (status = 502, description = "Uploads could not be loaded")
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn list_upload_users(
    RequireAdmin(_session): RequireAdmin,
    State(service): State<Arc<UploadService>>,
) -> Result<Json<ApiResponse<Vec<String>>>> {
    let listing = service.list(CatalogSort::default()).await?;
    let users = listing.catalog.unique_users();
    let total = users.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(users),
        listing.warning,
        Some(Meta { total }),
    )))
}

/// Dashboard statistics over all uploads
#[utoipa::path(
    get,
    path = "/api/admin/uploads/stats",
    responses(
        (status = 200, description = "Upload statistics", body = ApiResponse<CatalogStatsDto>),
        (status = 401, description = "Admin authentication required"),
        (status = 502, description = "Uploads could not be loaded")
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn upload_stats(
    RequireAdmin(_session): RequireAdmin,
    State(service): State<Arc<UploadService>>,
) -> Result<Json<ApiResponse<CatalogStatsDto>>> {
    let listing = service.list(CatalogSort::default()).await?;
    let stats = CatalogStatsDto::from(listing.catalog.stats());

    Ok(Json(ApiResponse::success(Some(stats), listing.warning, None)))
}

/// Delete an upload and its stored file
#[utoipa::path(
    delete,
    path = "/api/admin/uploads/{id}",
    params(
        ("id" = Uuid, Path, description = "Upload ID")
    ),
    responses(
        (status = 200, description = "File deleted successfully", body = ApiResponse<DeleteUploadResponseDto>),
        (status = 401, description = "Admin authentication required"),
        (status = 404, description = "Upload not found"),
        (status = 502, description = "Record could not be deleted")
    ),
    tag = "admin",
    security(
        ("basic_auth" = [])
    )
)]
pub async fn delete_upload(
    RequireAdmin(session): RequireAdmin,
    State(service): State<Arc<UploadService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteUploadResponseDto>>> {
    tracing::info!("Admin '{}' deleting upload {}", session.username, id);
    Ok(Json(delete_response(&service, id).await?))
}

#[cfg(test)]
mod tests {
    use crate::features::auth::{AdminAuthenticator, StaticCredentialAuthenticator};
    use crate::features::uploads::routes;
    use crate::features::uploads::services::CatalogRepository;
    use crate::features::uploads::UploadService;
    use crate::shared::test_helpers::{
        record, with_admin_session, InMemoryBlobStore, InMemoryUploadTable,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use base64::prelude::*;
    use serde_json::Value;
    use std::sync::Arc;

    fn service(table: &InMemoryUploadTable) -> Arc<UploadService> {
        Arc::new(UploadService::new(CatalogRepository::new(
            InMemoryBlobStore::new().shared(),
            table.shared(),
        )))
    }

    fn authenticator() -> Arc<dyn AdminAuthenticator> {
        Arc::new(StaticCredentialAuthenticator::new("admin", "admin123"))
    }

    /// Admin routes with the session injected, bypassing the Basic auth check
    fn admin_server(table: &InMemoryUploadTable) -> TestServer {
        let router = with_admin_session(routes::admin_handlers_router(service(table)));
        TestServer::new(router).unwrap()
    }

    fn seeded_table() -> InMemoryUploadTable {
        let table = InMemoryUploadTable::new();
        table.seed(record("Alice", "Q1 Report.pdf", "application/pdf", 2048));
        table.seed(record("Bob", "notes.txt", "text/plain", 1024));
        table.seed(record("Alice", "photo.png", "image/png", 1024));
        table
    }

    fn file_names(body: &Value) -> Vec<String> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["file_name"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let server = admin_server(&seeded_table());

        let body: Value = server
            .get("/api/admin/uploads?user=alice&sort_by=file_name&sort=asc")
            .await
            .json();

        assert_eq!(file_names(&body), vec!["Q1 Report.pdf", "photo.png"]);
        assert_eq!(body["meta"]["total"], 2);
    }

    #[tokio::test]
    async fn test_list_search_matches_file_or_user() {
        let server = admin_server(&seeded_table());

        let body: Value = server.get("/api/admin/uploads?search=REPORT").await.json();
        assert_eq!(file_names(&body), vec!["Q1 Report.pdf"]);

        let body: Value = server.get("/api/admin/uploads?search=bob").await.json();
        assert_eq!(file_names(&body), vec!["notes.txt"]);
    }

    #[tokio::test]
    async fn test_users_and_stats() {
        let server = admin_server(&seeded_table());

        let users: Value = server.get("/api/admin/uploads/users").await.json();
        assert_eq!(users["meta"]["total"], 2);

        let stats: Value = server.get("/api/admin/uploads/stats").await.json();
        assert_eq!(stats["data"]["total_files"], 3);
        assert_eq!(stats["data"]["total_size_bytes"], 4096);
        assert_eq!(stats["data"]["total_size_display"], "4 KB");
        assert_eq!(stats["data"]["unique_user_count"], 2);
        assert_eq!(stats["data"]["today_upload_count"], 3);
    }

    #[tokio::test]
    async fn test_unknown_sort_field_is_rejected() {
        let server = admin_server(&seeded_table());

        let response = server.get("/api/admin/uploads?sort_by=password").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_routes_require_credentials() {
        let table = seeded_table();
        let server = TestServer::new(routes::admin_routes(service(&table), authenticator())).unwrap();

        server
            .get("/api/admin/uploads")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let wrong = format!("Basic {}", BASE64_STANDARD.encode("admin:wrong"));
        server
            .get("/api/admin/uploads")
            .add_header("Authorization", wrong)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let right = format!("Basic {}", BASE64_STANDARD.encode("admin:admin123"));
        let response = server
            .get("/api/admin/uploads")
            .add_header("Authorization", right)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["meta"]["total"], 3);
    }

    #[tokio::test]
    async fn test_admin_delete() {
        let table = seeded_table();
        let id = table.rows()[1].id;
        let server = admin_server(&table);

        server
            .delete(&format!("/api/admin/uploads/{}", id))
            .await
            .assert_status_ok();

        let body: Value = server.get("/api/admin/uploads").await.json();
        assert_eq!(body["meta"]["total"], 2);
        assert!(!file_names(&body).contains(&"notes.txt".to_string()));
    }
}
