use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::features::reviews::handlers;
use crate::features::reviews::services::ReviewService;

/// Review routes (require a valid session)
pub fn routes(service: Arc<ReviewService>) -> Router {
    Router::new()
        .route(
            "/api/place-reviews",
            get(handlers::list_reviews).post(handlers::create_review),
        )
        .route("/api/place-reviews/my-review", get(handlers::my_review))
        .route("/api/place-reviews/my-reviews", get(handlers::my_reviews))
        .route(
            "/api/place-reviews/{id}",
            put(handlers::update_review).delete(handlers::delete_review),
        )
        .with_state(service)
}
