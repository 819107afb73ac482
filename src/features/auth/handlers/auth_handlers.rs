use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{AdminLoginRequestDto, AdminSessionDto};
use crate::features::auth::AdminAuthenticator;
use crate::shared::types::ApiResponse;
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// Check admin credentials
///
/// Admin endpoints take the same credentials as HTTP Basic auth on every
/// request; this endpoint only verifies them.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = AdminLoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AdminSessionDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(authenticator): State<Arc<dyn AdminAuthenticator>>,
    AppJson(dto): AppJson<AdminLoginRequestDto>,
) -> Result<Json<ApiResponse<AdminSessionDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = authenticator.authenticate(&dto.into())?;
    info!("Admin '{}' logged in", session.username);

    Ok(Json(ApiResponse::success(
        Some(session.into()),
        Some("Login successful".to_string()),
        None,
    )))
}
