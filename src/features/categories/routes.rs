use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;
use crate::shared::constants::MAX_MAP_MARKER_SIZE;

/// Category reads, open to everyone
pub fn public_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/place-categories", get(handlers::list_categories))
        .route("/api/place-categories/{id}", get(handlers::get_category))
        .with_state(service)
}

/// Category writes (admin)
pub fn protected_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/api/place-categories",
            post(handlers::create_category),
        )
        .route(
            "/api/place-categories/{id}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        // Marker size plus multipart overhead
        .layer(DefaultBodyLimit::max(MAX_MAP_MARKER_SIZE + 1024 * 1024))
        .with_state(service)
}
