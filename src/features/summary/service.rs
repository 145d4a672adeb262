use sqlx::{FromRow, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::summary::DataOverviewDto;

#[derive(Debug, FromRow)]
struct OverviewRow {
    total_user: i64,
    total_place: i64,
    total_review: i64,
}

pub struct SummaryService {
    pool: PgPool,
}

impl SummaryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn data_overview(&self) -> Result<DataOverviewDto> {
        let row = sqlx::query_as::<_, OverviewRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_user,
                (SELECT COUNT(*) FROM places) AS total_place,
                (SELECT COUNT(*) FROM place_reviews) AS total_review
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get data overview: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(DataOverviewDto {
            total_user: row.total_user,
            total_place: row.total_place,
            total_review: row.total_review,
        })
    }
}
