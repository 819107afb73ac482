use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::uploads::dtos as uploads_dtos;
use crate::features::uploads::handlers::{admin_handlers, upload_handlers};
use crate::features::uploads::models::{SortDirection, SortField};
use crate::shared::format::FileCategory;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Uploads (public)
        upload_handlers::upload_file,
        upload_handlers::list_uploads,
        upload_handlers::delete_upload,
        // Auth
        auth_handlers::login,
        // Admin
        admin_handlers::list_uploads,
        admin_handlers::list_upload_users,
        admin_handlers::upload_stats,
        admin_handlers::delete_upload,
    ),
    components(
        schemas(
            Meta,
            FileCategory,
            SortField,
            SortDirection,
            uploads_dtos::UploadFileDto,
            uploads_dtos::UploadRecordDto,
            uploads_dtos::UploadResultDto,
            uploads_dtos::DeleteUploadResponseDto,
            uploads_dtos::CatalogStatsDto,
            auth_dtos::AdminLoginRequestDto,
            auth_dtos::AdminSessionDto,
            ApiResponse<uploads_dtos::UploadResultDto>,
            ApiResponse<Vec<uploads_dtos::UploadRecordDto>>,
            ApiResponse<uploads_dtos::DeleteUploadResponseDto>,
            ApiResponse<uploads_dtos::CatalogStatsDto>,
            ApiResponse<Vec<String>>,
            ApiResponse<auth_dtos::AdminSessionDto>,
        )
    ),
    tags(
        (name = "uploads", description = "Upload page: submit, list and delete files"),
        (name = "auth", description = "Admin credential check"),
        (name = "admin", description = "Admin dashboard: search, filter, sort, statistics and delete"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Uploadbox API",
        version = "0.1.0",
        description = "File upload service backed by MinIO and Postgres",
    )
)]
pub struct ApiDoc;

/// Adds the HTTP Basic scheme used by the admin endpoints
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
