//! Authorization guard for admin handlers.
//!
//! The session is placed in the request extensions by
//! `core::middleware::admin_auth_middleware`.

use crate::core::error::AppError;
use crate::features::auth::model::AdminSession;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for admin-only handlers.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(session): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AdminSession);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminSession>()
            .cloned()
            .map(RequireAdmin)
            .ok_or_else(|| AppError::Unauthorized("Admin authentication required".to_string()))
    }
}
