use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::auth::model::{AdminCredentials, AdminSession};

/// Request DTO for admin login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AdminLoginRequestDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl From<AdminLoginRequestDto> for AdminCredentials {
    fn from(dto: AdminLoginRequestDto) -> Self {
        AdminCredentials::new(dto.username, dto.password)
    }
}

/// Response DTO for a successful admin login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminSessionDto {
    pub username: String,
    pub authenticated_at: DateTime<Utc>,
    /// How to authenticate the admin endpoints
    pub auth_scheme: String,
}

impl From<AdminSession> for AdminSessionDto {
    fn from(session: AdminSession) -> Self {
        Self {
            username: session.username,
            authenticated_at: session.authenticated_at,
            auth_scheme: "Basic".to_string(),
        }
    }
}
