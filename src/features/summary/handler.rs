use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::auth::guards::RequireAdmin;
use crate::features::summary::{DataOverviewDto, SummaryService};
use crate::shared::types::ApiResponse;

/// Total users, places and reviews
#[utoipa::path(
    get,
    path = "/api/summary/data-overview",
    tag = "summary",
    responses(
        (status = 200, description = "Overview counters", body = ApiResponse<DataOverviewDto>),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn data_overview(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<SummaryService>>,
) -> Result<Json<ApiResponse<DataOverviewDto>>> {
    let overview = service.data_overview().await?;
    Ok(Json(ApiResponse::success(Some(overview), None, None)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::features::summary::{routes, SummaryService};
    use crate::features::users::models::UserRole;
    use crate::shared::test_helpers::{create_test_user, lazy_pool, with_auth};

    #[tokio::test]
    async fn test_data_overview_requires_admin() {
        let app = with_auth(
            routes(Arc::new(SummaryService::new(lazy_pool()))),
            create_test_user(UserRole::User),
        );
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/summary/data-overview").await;
        response.assert_status(StatusCode::FORBIDDEN);
    }
}
