use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::places::dtos::{ActionMetadataDto, ActionStateDto, PlaceCountersDto};
use crate::features::places::models::{Reaction, ReactionState, Transition};
use crate::features::places::services::lock_place;
use crate::features::reviews::services::recompute_rating;

#[derive(Debug, FromRow)]
struct Counters {
    views: i64,
    likes: i64,
    dislikes: i64,
    saved: i64,
}

/// Like, dislike, bookmark and view counters of places.
///
/// Every toggle locks the place row, so the edge tables and the counters on
/// `places` move together.
pub struct EngagementService {
    pool: PgPool,
}

impl EngagementService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn like(&self, user_id: Uuid, place_id: Uuid) -> Result<Transition> {
        self.react(user_id, place_id, Reaction::Like).await
    }

    pub async fn dislike(&self, user_id: Uuid, place_id: Uuid) -> Result<Transition> {
        self.react(user_id, place_id, Reaction::Dislike).await
    }

    async fn react(&self, user_id: Uuid, place_id: Uuid, action: Reaction) -> Result<Transition> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        lock_place(&mut *tx, place_id).await?;

        let edge = find_reaction(&mut *tx, user_id, place_id).await?;
        let transition = ReactionState::from_edge(edge).apply(action);

        match transition.next.edge() {
            Some(reaction) => {
                sqlx::query(
                    r#"
                    INSERT INTO place_reactions (user_id, place_id, reaction)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (user_id, place_id)
                    DO UPDATE SET reaction = EXCLUDED.reaction, updated_at = NOW()
                    "#,
                )
                .bind(user_id)
                .bind(place_id)
                .bind(reaction)
                .execute(&mut *tx)
                .await
            }
            None => {
                sqlx::query("DELETE FROM place_reactions WHERE user_id = $1 AND place_id = $2")
                    .bind(user_id)
                    .bind(place_id)
                    .execute(&mut *tx)
                    .await
            }
        }
        .map_err(|e| {
            tracing::error!("Failed to write reaction: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query(
            r#"
            UPDATE places
            SET likes = likes + $2, dislikes = dislikes + $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(place_id)
        .bind(transition.like_delta)
        .bind(transition.dislike_delta)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update reaction counters: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit reaction: {:?}", e);
            AppError::Database(e)
        })?;

        debug!(
            "User {} {:?} place {}: now {:?}",
            user_id, action, place_id, transition.next
        );

        Ok(transition)
    }

    /// Toggle the caller's bookmark. Returns whether the place is now saved.
    pub async fn bookmark(&self, user_id: Uuid, place_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        lock_place(&mut *tx, place_id).await?;

        let removed = sqlx::query(
            "DELETE FROM place_bookmarks WHERE user_id = $1 AND place_id = $2",
        )
        .bind(user_id)
        .bind(place_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to remove bookmark: {:?}", e);
            AppError::Database(e)
        })?
        .rows_affected()
            > 0;

        if !removed {
            sqlx::query("INSERT INTO place_bookmarks (user_id, place_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(place_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to add bookmark: {:?}", e);
                    AppError::Database(e)
                })?;
        }

        let delta: i64 = if removed { -1 } else { 1 };
        sqlx::query("UPDATE places SET saved = saved + $2, updated_at = NOW() WHERE id = $1")
            .bind(place_id)
            .bind(delta)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update saved counter: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit bookmark: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(!removed)
    }

    pub async fn increment_view(&self, place_id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE places SET views = views + 1 WHERE id = $1")
            .bind(place_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to increment views: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Place not found".to_string()));
        }

        Ok(())
    }

    /// Counters of a place and which of them the caller contributed to
    pub async fn action_metadata(&self, user_id: Uuid, place_id: Uuid) -> Result<ActionMetadataDto> {
        let counters = self.find_counters(place_id).await?;

        let mut conn = self.pool.acquire().await.map_err(|e| {
            tracing::error!("Failed to acquire connection: {:?}", e);
            AppError::Database(e)
        })?;
        let state = ReactionState::from_edge(find_reaction(&mut *conn, user_id, place_id).await?);

        let bookmarked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM place_bookmarks WHERE user_id = $1 AND place_id = $2)",
        )
        .bind(user_id)
        .bind(place_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check bookmark: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(ActionMetadataDto {
            like: ActionStateDto {
                count: counters.likes,
                setted: state == ReactionState::Liked,
            },
            dislike: ActionStateDto {
                count: counters.dislikes,
                setted: state == ReactionState::Disliked,
            },
            saved: ActionStateDto {
                count: counters.saved,
                setted: bookmarked,
            },
        })
    }

    /// Rebuild like, dislike and saved from the edge tables and the rating
    /// from reviews
    pub async fn recount(&self, place_id: Uuid) -> Result<PlaceCountersDto> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        lock_place(&mut *tx, place_id).await?;

        let counters = sqlx::query_as::<_, Counters>(
            r#"
            UPDATE places SET
                likes = (SELECT COUNT(*) FROM place_reactions
                         WHERE place_id = $1 AND reaction = $2),
                dislikes = (SELECT COUNT(*) FROM place_reactions
                            WHERE place_id = $1 AND reaction = $3),
                saved = (SELECT COUNT(*) FROM place_bookmarks WHERE place_id = $1)
            WHERE id = $1
            RETURNING views, likes, dislikes, saved
            "#,
        )
        .bind(place_id)
        .bind(Reaction::Like)
        .bind(Reaction::Dislike)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to recount place counters: {:?}", e);
            AppError::Database(e)
        })?;

        let rating = recompute_rating(&mut *tx, place_id).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit recount: {:?}", e);
            AppError::Database(e)
        })?;

        info!(
            "Recounted place {}: like={}, dislike={}, saved={}, rating={}",
            place_id, counters.likes, counters.dislikes, counters.saved, rating
        );

        Ok(PlaceCountersDto {
            views: counters.views,
            like: counters.likes,
            dislike: counters.dislikes,
            saved: counters.saved,
            rating,
        })
    }

    async fn find_counters(&self, place_id: Uuid) -> Result<Counters> {
        sqlx::query_as::<_, Counters>(
            "SELECT views, likes, dislikes, saved FROM places WHERE id = $1",
        )
        .bind(place_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load place counters: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Place not found".to_string()))
    }
}

async fn find_reaction(
    conn: &mut PgConnection,
    user_id: Uuid,
    place_id: Uuid,
) -> Result<Option<Reaction>> {
    sqlx::query_scalar("SELECT reaction FROM place_reactions WHERE user_id = $1 AND place_id = $2")
        .bind(user_id)
        .bind(place_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load reaction: {:?}", e);
            AppError::Database(e)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{seed_place, seed_user};

    async fn counters(pool: &PgPool, place_id: Uuid) -> (i64, i64, i64) {
        sqlx::query_as("SELECT likes, dislikes, saved FROM places WHERE id = $1")
            .bind(place_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn reaction_edges(pool: &PgPool, place_id: Uuid) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM place_reactions WHERE place_id = $1")
            .bind(place_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_like_on_disliked_moves_both_counters(pool: PgPool) {
        let user_id = seed_user(&pool).await;
        let place_id = seed_place(&pool, user_id, None).await;
        let service = EngagementService::new(pool.clone());

        service.dislike(user_id, place_id).await.unwrap();
        assert_eq!(counters(&pool, place_id).await, (0, 1, 0));

        let transition = service.like(user_id, place_id).await.unwrap();
        assert_eq!(transition.next, ReactionState::Liked);
        assert_eq!(counters(&pool, place_id).await, (1, 0, 0));
        assert_eq!(reaction_edges(&pool, place_id).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_like_twice_restores_state(pool: PgPool) {
        let user_id = seed_user(&pool).await;
        let place_id = seed_place(&pool, user_id, None).await;
        let service = EngagementService::new(pool.clone());

        service.like(user_id, place_id).await.unwrap();
        let transition = service.like(user_id, place_id).await.unwrap();

        assert_eq!(transition.next, ReactionState::None);
        assert_eq!(counters(&pool, place_id).await, (0, 0, 0));
        assert_eq!(reaction_edges(&pool, place_id).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_bookmark_toggles_saved_counter(pool: PgPool) {
        let user_id = seed_user(&pool).await;
        let place_id = seed_place(&pool, user_id, None).await;
        let service = EngagementService::new(pool.clone());

        assert!(service.bookmark(user_id, place_id).await.unwrap());
        assert_eq!(counters(&pool, place_id).await, (0, 0, 1));

        let metadata = service.action_metadata(user_id, place_id).await.unwrap();
        assert!(metadata.saved.setted);
        assert!(!metadata.like.setted);

        assert!(!service.bookmark(user_id, place_id).await.unwrap());
        assert_eq!(counters(&pool, place_id).await, (0, 0, 0));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_missing_place_is_not_found(pool: PgPool) {
        let user_id = seed_user(&pool).await;
        let service = EngagementService::new(pool);
        let missing = Uuid::new_v4();

        assert!(matches!(
            service.like(user_id, missing).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.bookmark(user_id, missing).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.increment_view(missing).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_recount_rebuilds_drifted_counters(pool: PgPool) {
        let owner_id = seed_user(&pool).await;
        let fan_id = seed_user(&pool).await;
        let place_id = seed_place(&pool, owner_id, None).await;
        let service = EngagementService::new(pool.clone());

        service.like(fan_id, place_id).await.unwrap();
        service.increment_view(place_id).await.unwrap();
        sqlx::query(
            "INSERT INTO place_reviews (user_id, place_id, rating, content) VALUES ($1, $2, 4, 'ok')",
        )
        .bind(fan_id)
        .bind(place_id)
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("UPDATE places SET likes = 7, dislikes = 3, saved = 9, rating = 1 WHERE id = $1")
            .bind(place_id)
            .execute(&pool)
            .await
            .unwrap();

        let repaired = service.recount(place_id).await.unwrap();

        assert_eq!(repaired.views, 1);
        assert_eq!((repaired.like, repaired.dislike, repaired.saved), (1, 0, 0));
        assert_eq!(repaired.rating, 4.0);
        assert_eq!(counters(&pool, place_id).await, (1, 0, 0));
    }
}
