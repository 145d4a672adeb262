use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::guards::RequireAdmin;
use crate::features::categories::dtos::{
    CategoryFormDto, CategoryListQuery, CategoryResponseDto, CategoryUploadDto,
};
use crate::features::categories::services::CategoryService;
use crate::features::files::dtos::{UploadedFile, MARKER_EXTENSIONS};
use crate::shared::constants::MAX_MAP_MARKER_SIZE;
use crate::shared::types::{ok_message, ApiResponse, Meta};

/// Fields of a category form: `name`, `description` and the `mapMarker` file
async fn read_form(mut multipart: Multipart) -> Result<(CategoryFormDto, Option<UploadedFile>)> {
    let mut form = CategoryFormDto::default();
    let mut marker = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        match field.name() {
            Some("name") => {
                form.name = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid name field: {}", e)))?;
            }
            Some("description") => {
                form.description = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Invalid description field: {}", e))
                })?;
            }
            Some("mapMarker") => marker = Some(UploadedFile::read(field).await?),
            other => debug!("Ignoring unknown field: {:?}", other),
        }
    }

    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok((form, marker))
}

/// Create a category with its PNG map marker
#[utoipa::path(
    post,
    path = "/api/place-categories",
    tag = "place-categories",
    request_body(content = CategoryUploadDto, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Missing marker, wrong type or too large"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    let (form, marker) = read_form(multipart).await?;
    let marker =
        marker.ok_or_else(|| AppError::BadRequest("Map marker is required".to_string()))?;
    let extension = marker.validate_image(MARKER_EXTENSIONS, MAX_MAP_MARKER_SIZE)?;

    let category = service.create(form, marker, &extension).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category),
            Some("Category created".to_string()),
            None,
        )),
    ))
}

/// List categories, optionally with each one's most popular place
#[utoipa::path(
    get,
    path = "/api/place-categories",
    tag = "place-categories",
    params(CategoryListQuery),
    responses(
        (status = 200, description = "Categories", body = ApiResponse<Vec<CategoryResponseDto>>)
    )
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let categories = service
        .list(query.with_popular_place.unwrap_or(false))
        .await?;
    let total = categories.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta::total(total)),
    )))
}

#[utoipa::path(
    get,
    path = "/api/place-categories/{id}",
    tag = "place-categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Update a category. The marker is replaced only when `mapMarker` is sent.
#[utoipa::path(
    put,
    path = "/api/place-categories/{id}",
    tag = "place-categories",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body(content = CategoryUploadDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponseDto>),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_category(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let (form, marker) = read_form(multipart).await?;
    let marker = match marker {
        Some(upload) => {
            let extension = upload.validate_image(MARKER_EXTENSIONS, MAX_MAP_MARKER_SIZE)?;
            Some((upload, extension))
        }
        None => None,
    };

    let category = service.update(id, form, marker).await?;
    Ok(Json(ApiResponse::success(
        Some(category),
        Some("Category updated".to_string()),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/place-categories/{id}",
    tag = "place-categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still used by places")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ok_message()))
}
