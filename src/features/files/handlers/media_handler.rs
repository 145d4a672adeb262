//! Public proxies for stored media. Links handed out by the API point here.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::files::services::FileService;
use crate::shared::constants::{AVATARS_PREFIX, MAP_CONTENTS_PREFIX, MAP_MARKERS_PREFIX};

const MEDIA_CACHE_CONTROL: &str = "public, max-age=86400";

async fn serve(service: &FileService, prefix: &str, filename: &str) -> Result<Response, AppError> {
    let (data, content_type) = service.read_media(prefix, filename).await?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, MEDIA_CACHE_CONTROL),
        ],
        data,
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/map-contents/{filename}",
    params(("filename" = String, Path, description = "Stored image name")),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 404, description = "Not found")
    ),
    tag = "media"
)]
pub async fn map_content_media(
    State(service): State<Arc<FileService>>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    serve(&service, MAP_CONTENTS_PREFIX, &filename).await
}

#[utoipa::path(
    get,
    path = "/map-markers/{filename}",
    params(("filename" = String, Path, description = "Stored marker name")),
    responses(
        (status = 200, description = "Marker bytes"),
        (status = 404, description = "Not found")
    ),
    tag = "media"
)]
pub async fn map_marker_media(
    State(service): State<Arc<FileService>>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    serve(&service, MAP_MARKERS_PREFIX, &filename).await
}

#[utoipa::path(
    get,
    path = "/avatars/{filename}",
    params(("filename" = String, Path, description = "Stored avatar name")),
    responses(
        (status = 200, description = "Avatar bytes"),
        (status = 404, description = "Not found")
    ),
    tag = "media"
)]
pub async fn avatar_media(
    State(service): State<Arc<FileService>>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    serve(&service, AVATARS_PREFIX, &filename).await
}
