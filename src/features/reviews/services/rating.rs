//! Rating recalculation.
//!
//! A place's rating is the arithmetic mean of its review ratings, written back
//! inside the same transaction that changed the reviews.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Mean of the given ratings, 0 when there are none
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }

    let total: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    total as f64 / ratings.len() as f64
}

/// Recompute and store the rating of a place. Returns the new rating.
pub async fn recompute_rating(conn: &mut PgConnection, place_id: Uuid) -> Result<f64> {
    let ratings: Vec<i32> =
        sqlx::query_scalar("SELECT rating FROM place_reviews WHERE place_id = $1")
            .bind(place_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load review ratings: {:?}", e);
                AppError::Database(e)
            })?;

    let rating = average_rating(&ratings);

    sqlx::query("UPDATE places SET rating = $2 WHERE id = $1")
        .bind(place_id)
        .bind(rating)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update place rating: {:?}", e);
            AppError::Database(e)
        })?;

    tracing::debug!(
        "Place {} rating recomputed from {} reviews: {}",
        place_id,
        ratings.len(),
        rating
    );

    Ok(rating)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[5, 3, 4]), 4.0);
        assert_eq!(average_rating(&[5]), 5.0);
        assert_eq!(average_rating(&[1, 2]), 1.5);
    }

    #[test]
    fn test_average_rating_empty_is_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn test_average_rating_stays_in_range() {
        let ratings: Vec<i32> = (0..1000).map(|i| i % 5 + 1).collect();
        let avg = average_rating(&ratings);
        assert!((1.0..=5.0).contains(&avg));
        assert!((avg - 3.0).abs() < 1e-9);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_recompute_rating_writes_mean(pool: sqlx::PgPool) {
        use crate::shared::test_helpers::{seed_place, seed_user};

        let owner_id = seed_user(&pool).await;
        let place_id = seed_place(&pool, owner_id, None).await;
        for rating in [5, 3, 4] {
            let reviewer_id = seed_user(&pool).await;
            sqlx::query(
                "INSERT INTO place_reviews (user_id, place_id, rating, content) VALUES ($1, $2, $3, 'ok')",
            )
            .bind(reviewer_id)
            .bind(place_id)
            .bind(rating)
            .execute(&pool)
            .await
            .unwrap();
        }

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(recompute_rating(&mut *conn, place_id).await.unwrap(), 4.0);

        let stored: f64 = sqlx::query_scalar("SELECT rating FROM places WHERE id = $1")
            .bind(place_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, 4.0);

        sqlx::query("DELETE FROM place_reviews WHERE place_id = $1")
            .bind(place_id)
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(recompute_rating(&mut *conn, place_id).await.unwrap(), 0.0);
    }
}
