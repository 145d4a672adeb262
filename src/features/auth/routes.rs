use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

/// Public auth routes (no authentication required)
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/google", get(handlers::google_redirect))
        .route("/api/auth/google/callback", get(handlers::google_callback))
        .route(
            "/api/auth/google/mobile-callback",
            get(handlers::google_mobile_callback),
        )
        .with_state(service)
}

/// Protected auth routes (require a valid session)
pub fn protected_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/my-session", get(handlers::my_session))
        .route("/api/auth/logout", delete(handlers::logout))
        .with_state(service)
}
