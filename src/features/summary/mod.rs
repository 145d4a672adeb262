//! Admin overview counters

mod handler;
mod service;

use std::sync::Arc;

use axum::{routing::get, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use handler::{__path_data_overview, data_overview};
pub use service::SummaryService;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DataOverviewDto {
    pub total_user: i64,
    pub total_place: i64,
    pub total_review: i64,
}

pub fn routes(service: Arc<SummaryService>) -> Router {
    Router::new()
        .route("/api/summary/data-overview", get(data_overview))
        .with_state(service)
}
