use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{
    avatar_media, map_content_media, map_marker_media, upload_map_content,
};
use crate::features::files::services::FileService;
use crate::shared::constants::MAX_MAP_CONTENT_SIZE;

/// Upload routes (require a valid session)
pub fn routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route(
            "/api/files/map-contents",
            // Allow body size up to MAX_MAP_CONTENT_SIZE + buffer for multipart overhead
            post(upload_map_content)
                .layer(DefaultBodyLimit::max(MAX_MAP_CONTENT_SIZE + 1024 * 1024)),
        )
        .with_state(file_service)
}

/// Public media proxy routes
pub fn media_routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route("/map-contents/{filename}", get(map_content_media))
        .route("/map-markers/{filename}", get(map_marker_media))
        .route("/avatars/{filename}", get(avatar_media))
        .with_state(file_service)
}
