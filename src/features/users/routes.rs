use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};

use crate::features::users::handlers;
use crate::features::users::services::UserService;
use crate::shared::constants::MAX_AVATAR_SIZE;

/// User management routes (require a valid session)
pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users", get(handlers::list_users))
        .route(
            "/api/users/avatars",
            post(handlers::upload_avatar).layer(DefaultBodyLimit::max(MAX_AVATAR_SIZE + 1024 * 1024)),
        )
        .route("/api/users/info", patch(handlers::change_info))
        .route("/api/users/role", patch(handlers::change_role))
        .route("/api/users/{id}", delete(handlers::delete_user))
        .with_state(service)
}
