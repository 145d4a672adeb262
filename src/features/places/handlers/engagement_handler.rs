use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::places::dtos::{ActionMetadataDto, PlaceCountersDto};
use crate::features::places::services::EngagementService;
use crate::shared::types::{ok_message, ApiResponse};

/// Toggle like. Clears an existing dislike.
#[utoipa::path(
    post,
    path = "/api/places/{id}/like",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Reaction toggled"),
        (status = 404, description = "Place not found")
    ),
    tag = "place-actions",
    security(("bearer_auth" = []))
)]
pub async fn like_place(
    user: AuthenticatedUser,
    State(service): State<Arc<EngagementService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.like(user.user_id, id).await?;
    Ok(Json(ok_message()))
}

/// Toggle dislike. Clears an existing like.
#[utoipa::path(
    post,
    path = "/api/places/{id}/dislike",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Reaction toggled"),
        (status = 404, description = "Place not found")
    ),
    tag = "place-actions",
    security(("bearer_auth" = []))
)]
pub async fn dislike_place(
    user: AuthenticatedUser,
    State(service): State<Arc<EngagementService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.dislike(user.user_id, id).await?;
    Ok(Json(ok_message()))
}

#[utoipa::path(
    post,
    path = "/api/places/{id}/inc-views",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "View counted"),
        (status = 404, description = "Place not found")
    ),
    tag = "place-actions",
    security(("bearer_auth" = []))
)]
pub async fn increment_views(
    State(service): State<Arc<EngagementService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.increment_view(id).await?;
    Ok(Json(ok_message()))
}

/// Toggle bookmark
#[utoipa::path(
    post,
    path = "/api/places/{id}/add-bookmarks",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Bookmark toggled"),
        (status = 404, description = "Place not found")
    ),
    tag = "place-actions",
    security(("bearer_auth" = []))
)]
pub async fn toggle_bookmark(
    user: AuthenticatedUser,
    State(service): State<Arc<EngagementService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.bookmark(user.user_id, id).await?;
    Ok(Json(ok_message()))
}

/// Counters with the caller's own like, dislike and bookmark state
#[utoipa::path(
    get,
    path = "/api/places/{id}/action-metadata",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Action metadata", body = ApiResponse<ActionMetadataDto>),
        (status = 404, description = "Place not found")
    ),
    tag = "place-actions",
    security(("bearer_auth" = []))
)]
pub async fn action_metadata(
    user: AuthenticatedUser,
    State(service): State<Arc<EngagementService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ActionMetadataDto>>> {
    let metadata = service.action_metadata(user.user_id, id).await?;
    Ok(Json(ApiResponse::success(Some(metadata), None, None)))
}

/// Rebuild counters and rating from stored reactions, bookmarks and reviews (admin)
#[utoipa::path(
    post,
    path = "/api/places/{id}/recount",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Recounted values", body = ApiResponse<PlaceCountersDto>),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Place not found")
    ),
    tag = "place-actions",
    security(("bearer_auth" = []))
)]
pub async fn recount(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<EngagementService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PlaceCountersDto>>> {
    let counters = service.recount(id).await?;
    Ok(Json(ApiResponse::success(Some(counters), None, None)))
}
