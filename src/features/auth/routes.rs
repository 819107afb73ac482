use crate::features::auth::handlers;
use crate::features::auth::AdminAuthenticator;
use axum::{routing::post, Router};
use std::sync::Arc;

/// Public auth routes (no authentication required)
pub fn public_routes(authenticator: Arc<dyn AdminAuthenticator>) -> Router {
    Router::new()
        .route("/api/admin/login", post(handlers::login))
        .with_state(authenticator)
}
