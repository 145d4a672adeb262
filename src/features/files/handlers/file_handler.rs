use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    FileResponseDto, UploadImageDto, UploadedFile, IMAGE_EXTENSIONS,
};
use crate::features::files::services::FileService;
use crate::shared::constants::MAX_MAP_CONTENT_SIZE;
use crate::shared::types::ApiResponse;

/// Upload a place or review image
///
/// Accepts multipart/form-data with a single `file` field (png, jpg or jpeg).
/// The file stays unused until a place or review references it.
#[utoipa::path(
    post,
    path = "/api/files/map-contents",
    tag = "files",
    request_body(
        content = UploadImageDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Image uploaded", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Missing file, wrong type or too large"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_map_content(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>), AppError> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        match field.name() {
            Some("file") => upload = Some(UploadedFile::read(field).await?),
            other => debug!("Ignoring unknown field: {:?}", other),
        }
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let extension = upload.validate_image(IMAGE_EXTENSIONS, MAX_MAP_CONTENT_SIZE)?;

    let response = service
        .upload_map_content(user.user_id, upload, &extension)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}
