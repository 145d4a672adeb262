use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::places::dtos::{CoordinateDto, KeywordQuery, NearbyPlaceQuery, PlaceCardDto};
use crate::features::places::services::SearchService;
use crate::shared::types::ApiResponse;

/// Top rated places
#[utoipa::path(
    get,
    path = "/api/places/highlight",
    responses(
        (status = 200, description = "Highlighted places", body = ApiResponse<Vec<PlaceCardDto>>)
    ),
    tag = "place-search",
    security(("bearer_auth" = []))
)]
pub async fn highlight(
    State(service): State<Arc<SearchService>>,
) -> Result<Json<ApiResponse<Vec<PlaceCardDto>>>> {
    let places = service.highlight().await?;
    Ok(Json(ApiResponse::success(Some(places), None, None)))
}

/// Places closest to the given position
#[utoipa::path(
    post,
    path = "/api/places/nearest",
    request_body = CoordinateDto,
    responses(
        (status = 200, description = "Places by distance", body = ApiResponse<Vec<PlaceCardDto>>),
        (status = 400, description = "Invalid coordinate")
    ),
    tag = "place-search",
    security(("bearer_auth" = []))
)]
pub async fn nearest(
    State(service): State<Arc<SearchService>>,
    AppJson(dto): AppJson<CoordinateDto>,
) -> Result<Json<ApiResponse<Vec<PlaceCardDto>>>> {
    let places = service.nearest(dto.to_coordinate()?).await?;
    Ok(Json(ApiResponse::success(Some(places), None, None)))
}

/// Same-category places near another place
#[utoipa::path(
    get,
    path = "/api/places/nearby-place",
    params(NearbyPlaceQuery),
    responses(
        (status = 200, description = "Nearby places", body = ApiResponse<Vec<PlaceCardDto>>),
        (status = 400, description = "Missing placeId"),
        (status = 404, description = "Place not found")
    ),
    tag = "place-search",
    security(("bearer_auth" = []))
)]
pub async fn nearby_place(
    State(service): State<Arc<SearchService>>,
    Query(query): Query<NearbyPlaceQuery>,
) -> Result<Json<ApiResponse<Vec<PlaceCardDto>>>> {
    let places = service.nearby_place(query.place_id).await?;
    Ok(Json(ApiResponse::success(Some(places), None, None)))
}

/// Keyword search around the given position
#[utoipa::path(
    post,
    path = "/api/places/map-search",
    params(KeywordQuery),
    request_body = CoordinateDto,
    responses(
        (status = 200, description = "Matching places by distance", body = ApiResponse<Vec<PlaceCardDto>>),
        (status = 400, description = "Missing keyword or invalid coordinate")
    ),
    tag = "place-search",
    security(("bearer_auth" = []))
)]
pub async fn map_search(
    State(service): State<Arc<SearchService>>,
    Query(query): Query<KeywordQuery>,
    AppJson(dto): AppJson<CoordinateDto>,
) -> Result<Json<ApiResponse<Vec<PlaceCardDto>>>> {
    let places = service
        .map_search(query.keyword.as_deref(), dto.to_coordinate()?)
        .await?;
    Ok(Json(ApiResponse::success(Some(places), None, None)))
}

/// The three closest places with their AR covers
#[utoipa::path(
    post,
    path = "/api/places/ar-map-search",
    request_body = CoordinateDto,
    responses(
        (status = 200, description = "Closest places", body = ApiResponse<Vec<PlaceCardDto>>),
        (status = 400, description = "Invalid coordinate")
    ),
    tag = "place-search",
    security(("bearer_auth" = []))
)]
pub async fn ar_map_search(
    State(service): State<Arc<SearchService>>,
    AppJson(dto): AppJson<CoordinateDto>,
) -> Result<Json<ApiResponse<Vec<PlaceCardDto>>>> {
    let places = service.ar_map_search(dto.to_coordinate()?).await?;
    Ok(Json(ApiResponse::success(Some(places), None, None)))
}
