use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, ClientInfo};
use crate::features::auth::dtos::{
    GoogleCallbackQuery, LoginRequestDto, LoginResponseDto, MobileAuthResponseDto, MySessionDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::shared::types::{ok_message, ApiResponse};
use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials or inactive account")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    client: ClientInfo,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<LoginResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = service.login(dto, client).await?;
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}

/// Redirect the browser to the Google consent page
#[utoipa::path(
    get,
    path = "/api/auth/google",
    responses(
        (status = 303, description = "Redirect to Google"),
        (status = 400, description = "Google sign-in not configured")
    ),
    tag = "auth"
)]
pub async fn google_redirect(State(service): State<Arc<AuthService>>) -> Result<Redirect> {
    let url = service.google_authorization_url()?;
    Ok(Redirect::to(&url))
}

/// Google OAuth callback for the web client.
///
/// Always redirects back to the web client, with either the access token or an error flag.
#[utoipa::path(
    get,
    path = "/api/auth/google/callback",
    params(GoogleCallbackQuery),
    responses(
        (status = 303, description = "Redirect to the web client")
    ),
    tag = "auth"
)]
pub async fn google_callback(
    State(service): State<Arc<AuthService>>,
    client: ClientInfo,
    Query(query): Query<GoogleCallbackQuery>,
) -> Redirect {
    let outcome = match query.code.as_deref().filter(|c| !c.is_empty()) {
        Some(code) => service.google_web_login(code, client).await,
        None => Err(AppError::BadRequest("Missing authorization code".to_string())),
    };

    if let Err(e) = &outcome {
        tracing::warn!("Google web sign-in failed: {}", e);
    }

    Redirect::to(&service.web_redirect_url(&outcome))
}

/// Google sign-in for the mobile app. `code` carries a Google ID token.
#[utoipa::path(
    get,
    path = "/api/auth/google/mobile-callback",
    params(GoogleCallbackQuery),
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<MobileAuthResponseDto>),
        (status = 400, description = "Missing or invalid ID token")
    ),
    tag = "auth"
)]
pub async fn google_mobile_callback(
    State(service): State<Arc<AuthService>>,
    client: ClientInfo,
    Query(query): Query<GoogleCallbackQuery>,
) -> Result<Json<ApiResponse<MobileAuthResponseDto>>> {
    let id_token = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing ID token".to_string()))?;

    let auth_token = service
        .google_mobile_login(&id_token, client)
        .await
        .map_err(|e| match e {
            AppError::Database(_) | AppError::Internal(_) => e,
            other => AppError::BadRequest(other.to_string()),
        })?;

    Ok(Json(ApiResponse::success(
        Some(MobileAuthResponseDto { auth_token }),
        None,
        None,
    )))
}

/// Current user with review count and super admin flag
#[utoipa::path(
    get,
    path = "/api/auth/my-session",
    responses(
        (status = 200, description = "Current session", body = ApiResponse<MySessionDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn my_session(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<MySessionDto>>> {
    let session = service.my_session(&user).await?;
    Ok(Json(ApiResponse::success(Some(session), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Signed out"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<()>>> {
    service.logout(&user).await?;
    Ok(Json(ok_message()))
}
