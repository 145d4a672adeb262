use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequireAdmin, RequireSuperAdmin};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{UploadImageDto, UploadedFile, IMAGE_EXTENSIONS};
use crate::features::users::dtos::{
    AvatarResponseDto, ChangeInfoDto, ChangeRoleDto, ChangeRoleQuery, UserListQuery,
    UserResponseDto,
};
use crate::features::users::services::UserService;
use crate::shared::constants::MAX_AVATAR_SIZE;
use crate::shared::types::{ok_message, resolve_limit, ApiResponse, Meta};

/// List active users with their contribution summary (admin)
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let (users, total) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(
        Some(users),
        None,
        Some(Meta::with_limit(total, resolve_limit(query.limit))),
    )))
}

/// Replace the caller's avatar (png, jpg or jpeg, at most 1 MB)
#[utoipa::path(
    post,
    path = "/api/users/avatars",
    tag = "users",
    request_body(content = UploadImageDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar replaced", body = ApiResponse<AvatarResponseDto>),
        (status = 400, description = "Missing file, wrong type or too large")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_avatar(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<AvatarResponseDto>>> {
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
    let extension = upload.validate_image(IMAGE_EXTENSIONS, MAX_AVATAR_SIZE)?;

    let avatar = service
        .update_avatar(user.user_id, upload, &extension)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(avatar),
        Some("ok".to_string()),
        None,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/users/info",
    tag = "users",
    request_body = ChangeInfoDto,
    responses(
        (status = 200, description = "Name changed"),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_info(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<ChangeInfoDto>,
) -> Result<Json<ApiResponse<()>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.change_info(user.user_id, dto).await?;
    Ok(Json(ok_message()))
}

/// Change another user's role (super admin)
#[utoipa::path(
    patch,
    path = "/api/users/role",
    tag = "users",
    params(ChangeRoleQuery),
    request_body = ChangeRoleDto,
    responses(
        (status = 200, description = "Role changed"),
        (status = 400, description = "Target is a super admin"),
        (status = 403, description = "Super admin access required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_role(
    RequireSuperAdmin(caller): RequireSuperAdmin,
    State(service): State<Arc<UserService>>,
    Query(query): Query<ChangeRoleQuery>,
    AppJson(dto): AppJson<ChangeRoleDto>,
) -> Result<Json<ApiResponse<()>>> {
    service.change_role(&caller, query.user_id, dto).await?;
    Ok(Json(ok_message()))
}

/// Delete a user and all of their content (super admin)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Own or super admin account"),
        (status = 403, description = "Super admin access required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    RequireSuperAdmin(caller): RequireSuperAdmin,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&caller, id).await?;
    Ok(Json(ok_message()))
}
