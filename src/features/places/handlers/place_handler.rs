use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::places::dtos::{
    PlaceCardDto, PlaceDetailDto, PlaceImageDto, PlaceListItemDto, PlaceListQuery,
    PlaceRequestDto,
};
use crate::features::places::services::PlaceService;
use crate::shared::types::{ok_message, resolve_limit, ApiResponse, Meta};

/// Submit a new place
///
/// Regular users need at least 10 reviews first. The place is published
/// right away.
#[utoipa::path(
    post,
    path = "/api/places",
    request_body = PlaceRequestDto,
    responses(
        (status = 201, description = "Place created", body = ApiResponse<PlaceDetailDto>),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Authentication required")
    ),
    tag = "places",
    security(("bearer_auth" = []))
)]
pub async fn create_place(
    user: AuthenticatedUser,
    State(service): State<Arc<PlaceService>>,
    AppJson(dto): AppJson<PlaceRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<PlaceDetailDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let place = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(place), None, None)),
    ))
}

/// List all places (admin)
#[utoipa::path(
    get,
    path = "/api/places",
    params(PlaceListQuery),
    responses(
        (status = 200, description = "Places", body = ApiResponse<Vec<PlaceListItemDto>>),
        (status = 403, description = "Admin access required")
    ),
    tag = "places",
    security(("bearer_auth" = []))
)]
pub async fn list_places(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<PlaceService>>,
    Query(query): Query<PlaceListQuery>,
) -> Result<Json<ApiResponse<Vec<PlaceListItemDto>>>> {
    let (places, total) = service.list(&query).await?;
    let meta = Meta::with_limit(total, resolve_limit(query.limit));
    Ok(Json(ApiResponse::success(Some(places), None, Some(meta))))
}

/// Places submitted by the caller
#[utoipa::path(
    get,
    path = "/api/places/my-places",
    responses(
        (status = 200, description = "Caller's places", body = ApiResponse<Vec<PlaceCardDto>>)
    ),
    tag = "places",
    security(("bearer_auth" = []))
)]
pub async fn my_places(
    user: AuthenticatedUser,
    State(service): State<Arc<PlaceService>>,
) -> Result<Json<ApiResponse<Vec<PlaceCardDto>>>> {
    let places = service.my_places(user.user_id).await?;
    let meta = Meta::total(places.len() as i64);
    Ok(Json(ApiResponse::success(Some(places), None, Some(meta))))
}

/// Places bookmarked by the caller, latest bookmark first
#[utoipa::path(
    get,
    path = "/api/places/bookmarks",
    responses(
        (status = 200, description = "Bookmarked places", body = ApiResponse<Vec<PlaceCardDto>>)
    ),
    tag = "places",
    security(("bearer_auth" = []))
)]
pub async fn bookmarks(
    user: AuthenticatedUser,
    State(service): State<Arc<PlaceService>>,
) -> Result<Json<ApiResponse<Vec<PlaceCardDto>>>> {
    let places = service.bookmarks(user.user_id).await?;
    Ok(Json(ApiResponse::success(Some(places), None, None)))
}

/// Place detail
#[utoipa::path(
    get,
    path = "/api/places/{id}",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Place detail", body = ApiResponse<PlaceDetailDto>),
        (status = 404, description = "Place not found")
    ),
    tag = "places"
)]
pub async fn get_place(
    State(service): State<Arc<PlaceService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PlaceDetailDto>>> {
    let place = service.detail(id).await?;
    Ok(Json(ApiResponse::success(Some(place), None, None)))
}

/// Place images followed by review images
#[utoipa::path(
    get,
    path = "/api/places/{id}/images",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Images", body = ApiResponse<Vec<PlaceImageDto>>),
        (status = 404, description = "Place not found")
    ),
    tag = "places",
    security(("bearer_auth" = []))
)]
pub async fn place_images(
    State(service): State<Arc<PlaceService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PlaceImageDto>>>> {
    let images = service.images(id).await?;
    Ok(Json(ApiResponse::success(Some(images), None, None)))
}

/// Edit a place (owner or admin)
#[utoipa::path(
    put,
    path = "/api/places/{id}",
    params(("id" = Uuid, Path, description = "Place ID")),
    request_body = PlaceRequestDto,
    responses(
        (status = 200, description = "Place updated", body = ApiResponse<PlaceDetailDto>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Place not found")
    ),
    tag = "places",
    security(("bearer_auth" = []))
)]
pub async fn update_place(
    user: AuthenticatedUser,
    State(service): State<Arc<PlaceService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<PlaceRequestDto>,
) -> Result<Json<ApiResponse<PlaceDetailDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let place = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(place), None, None)))
}

/// Delete a place with its reviews and engagement (owner or admin)
#[utoipa::path(
    delete,
    path = "/api/places/{id}",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Place deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Place not found")
    ),
    tag = "places",
    security(("bearer_auth" = []))
)]
pub async fn delete_place(
    user: AuthenticatedUser,
    State(service): State<Arc<PlaceService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&user, id).await?;
    Ok(Json(ok_message()))
}
