use sqlx::PgConnection;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::places::models::Place;

/// Lock the place row for the rest of the transaction.
///
/// Counter updates and rating recomputes for the same place queue up behind
/// this lock.
pub async fn lock_place(conn: &mut PgConnection, place_id: Uuid) -> Result<Place> {
    sqlx::query_as::<_, Place>("SELECT * FROM places WHERE id = $1 FOR UPDATE")
        .bind(place_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to lock place {}: {:?}", place_id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Place not found".to_string()))
}
