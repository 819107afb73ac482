use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get},
    Router,
};
use std::sync::Arc;

use crate::core::middleware::admin_auth_middleware;
use crate::features::auth::AdminAuthenticator;
use crate::features::uploads::handlers::{admin_handlers, upload_handlers};
use crate::features::uploads::UploadService;

/// Upload page routes (no authentication)
pub fn public_routes(service: Arc<UploadService>, max_body_size: usize) -> Router {
    Router::new()
        .route(
            "/api/uploads",
            get(upload_handlers::list_uploads).post(upload_handlers::upload_file).layer(
                // Room for the largest allowed file plus multipart overhead
                DefaultBodyLimit::max(max_body_size),
            ),
        )
        .route("/api/uploads/{id}", delete(upload_handlers::delete_upload))
        .with_state(service)
}

/// Admin dashboard routes behind HTTP Basic credentials
pub fn admin_routes(
    service: Arc<UploadService>,
    authenticator: Arc<dyn AdminAuthenticator>,
) -> Router {
    admin_handlers_router(service)
        .route_layer(from_fn_with_state(authenticator, admin_auth_middleware))
}

/// Admin handlers without the credential check; the caller supplies the session
pub(crate) fn admin_handlers_router(service: Arc<UploadService>) -> Router {
    Router::new()
        .route("/api/admin/uploads", get(admin_handlers::list_uploads))
        .route(
            "/api/admin/uploads/users",
            get(admin_handlers::list_upload_users),
        )
        .route("/api/admin/uploads/stats", get(admin_handlers::upload_stats))
        .route(
            "/api/admin/uploads/{id}",
            delete(admin_handlers::delete_upload),
        )
        .with_state(service)
}
