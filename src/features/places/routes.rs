use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::features::places::handlers;
use crate::features::places::services::{EngagementService, PlaceService, SearchService};

/// Public place routes (no authentication required)
pub fn public_routes(place_service: Arc<PlaceService>) -> Router {
    Router::new()
        .route("/api/places/{id}", get(handlers::get_place))
        .with_state(place_service)
}

/// Protected place routes (require a valid session)
pub fn protected_routes(
    place_service: Arc<PlaceService>,
    search_service: Arc<SearchService>,
    engagement_service: Arc<EngagementService>,
) -> Router {
    let places = Router::new()
        .route(
            "/api/places",
            post(handlers::create_place).get(handlers::list_places),
        )
        .route("/api/places/my-places", get(handlers::my_places))
        .route("/api/places/bookmarks", get(handlers::bookmarks))
        .route("/api/places/{id}/images", get(handlers::place_images))
        .route(
            "/api/places/{id}",
            put(handlers::update_place).delete(handlers::delete_place),
        )
        .with_state(place_service);

    let search = Router::new()
        .route("/api/places/highlight", get(handlers::highlight))
        .route("/api/places/nearest", post(handlers::nearest))
        .route("/api/places/nearby-place", get(handlers::nearby_place))
        .route("/api/places/map-search", post(handlers::map_search))
        .route("/api/places/ar-map-search", post(handlers::ar_map_search))
        .with_state(search_service);

    let engagement = Router::new()
        .route("/api/places/{id}/like", post(handlers::like_place))
        .route("/api/places/{id}/dislike", post(handlers::dislike_place))
        .route("/api/places/{id}/inc-views", post(handlers::increment_views))
        .route("/api/places/{id}/add-bookmarks", post(handlers::toggle_bookmark))
        .route(
            "/api/places/{id}/action-metadata",
            get(handlers::action_metadata),
        )
        .route("/api/places/{id}/recount", post(handlers::recount))
        .with_state(engagement_service);

    places.merge(search).merge(engagement)
}
