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
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reviews::dtos::{
    MyReviewDto, PlaceIdQuery, ReviewDto, ReviewListQuery, ReviewRequestDto,
};
use crate::features::reviews::services::ReviewService;
use crate::shared::types::{ok_message, resolve_limit, ApiResponse, Meta};

/// Review a place
#[utoipa::path(
    post,
    path = "/api/place-reviews",
    params(PlaceIdQuery),
    request_body = ReviewRequestDto,
    responses(
        (status = 201, description = "Review created", body = ApiResponse<ReviewDto>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Place not found"),
        (status = 409, description = "Place already reviewed")
    ),
    tag = "place-reviews",
    security(("bearer_auth" = []))
)]
pub async fn create_review(
    user: AuthenticatedUser,
    State(service): State<Arc<ReviewService>>,
    Query(query): Query<PlaceIdQuery>,
    AppJson(dto): AppJson<ReviewRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let review = service.create(user.user_id, query.place_id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(review), None, None)),
    ))
}

/// List reviews, optionally for one place
#[utoipa::path(
    get,
    path = "/api/place-reviews",
    params(ReviewListQuery),
    responses(
        (status = 200, description = "Reviews", body = ApiResponse<Vec<ReviewDto>>)
    ),
    tag = "place-reviews",
    security(("bearer_auth" = []))
)]
pub async fn list_reviews(
    State(service): State<Arc<ReviewService>>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<ApiResponse<Vec<ReviewDto>>>> {
    let (reviews, total) = service.list(&query).await?;
    let meta = Meta::with_limit(total, resolve_limit(query.limit));
    Ok(Json(ApiResponse::success(Some(reviews), None, Some(meta))))
}

/// The caller's review of a place; `data` is null when there is none
#[utoipa::path(
    get,
    path = "/api/place-reviews/my-review",
    params(PlaceIdQuery),
    responses(
        (status = 200, description = "Own review", body = ApiResponse<ReviewDto>)
    ),
    tag = "place-reviews",
    security(("bearer_auth" = []))
)]
pub async fn my_review(
    user: AuthenticatedUser,
    State(service): State<Arc<ReviewService>>,
    Query(query): Query<PlaceIdQuery>,
) -> Result<Json<ApiResponse<ReviewDto>>> {
    let review = service.my_review(user.user_id, query.place_id).await?;
    Ok(Json(ApiResponse::success(review, None, None)))
}

#[utoipa::path(
    get,
    path = "/api/place-reviews/my-reviews",
    responses(
        (status = 200, description = "Own reviews", body = ApiResponse<Vec<MyReviewDto>>)
    ),
    tag = "place-reviews",
    security(("bearer_auth" = []))
)]
pub async fn my_reviews(
    user: AuthenticatedUser,
    State(service): State<Arc<ReviewService>>,
) -> Result<Json<ApiResponse<Vec<MyReviewDto>>>> {
    let reviews = service.my_reviews(user.user_id).await?;
    let meta = Meta::total(reviews.len() as i64);
    Ok(Json(ApiResponse::success(Some(reviews), None, Some(meta))))
}

/// Edit the caller's review
#[utoipa::path(
    put,
    path = "/api/place-reviews/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = ReviewRequestDto,
    responses(
        (status = 200, description = "Review updated", body = ApiResponse<ReviewDto>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Review not found")
    ),
    tag = "place-reviews",
    security(("bearer_auth" = []))
)]
pub async fn update_review(
    user: AuthenticatedUser,
    State(service): State<Arc<ReviewService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ReviewRequestDto>,
) -> Result<Json<ApiResponse<ReviewDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let review = service.update(user.user_id, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(review), None, None)))
}

/// Delete a review (author or admin)
#[utoipa::path(
    delete,
    path = "/api/place-reviews/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    ),
    tag = "place-reviews",
    security(("bearer_auth" = []))
)]
pub async fn delete_review(
    user: AuthenticatedUser,
    State(service): State<Arc<ReviewService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&user, id).await?;
    Ok(Json(ok_message()))
}
