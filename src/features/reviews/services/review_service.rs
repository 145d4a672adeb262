use std::collections::HashMap;
use std::sync::Arc;

use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::ImageDto;
use crate::features::files::models::FileKind;
use crate::features::files::services::{mark_unused, mark_used};
use crate::features::files::FileService;
use crate::features::places::services::lock_place;
use crate::features::reviews::dtos::{
    MyReviewDto, ReviewDto, ReviewListFilter, ReviewListQuery, ReviewRequestDto,
    ReviewedPlaceDto,
};
use crate::features::reviews::models::{
    PlaceReview, ReviewRow, PLACE_REVIEW_COLUMNS, REVIEW_SELECT,
};
use crate::features::reviews::services::recompute_rating;
use crate::features::users::dtos::UserBriefDto;
use crate::features::users::models::UserBrief;
use crate::shared::links::MediaLinks;
use crate::shared::types::resolve_limit;

#[derive(Debug, FromRow)]
struct MyReviewRow {
    id: Uuid,
    rating: i32,
    content: String,
    image_ids: Vec<Uuid>,
    place_id: Uuid,
    place_name: String,
    cover_filename: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

/// Service for place reviews. Every write recomputes the place rating in
/// the same transaction, behind the place row lock.
pub struct ReviewService {
    pool: PgPool,
    files: Arc<FileService>,
    links: MediaLinks,
}

impl ReviewService {
    pub fn new(pool: PgPool, files: Arc<FileService>, links: MediaLinks) -> Self {
        Self { pool, files, links }
    }

    /// Write the caller's review of a place. One review per user and place.
    pub async fn create(
        &self,
        user_id: Uuid,
        place_id: Uuid,
        dto: ReviewRequestDto,
    ) -> Result<ReviewDto> {
        let image_ids = self.own_image_ids(user_id, &dto.image_ids, &[]).await?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        lock_place(&mut *tx, place_id).await?;

        let already_reviewed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM place_reviews WHERE user_id = $1 AND place_id = $2)",
        )
        .bind(user_id)
        .bind(place_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check existing review: {:?}", e);
            AppError::Database(e)
        })?;
        if already_reviewed {
            return Err(duplicate_review());
        }

        let sql = format!(
            "INSERT INTO place_reviews (user_id, place_id, rating, content, image_ids) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            PLACE_REVIEW_COLUMNS
        );
        let review = sqlx::query_as::<_, PlaceReview>(&sql)
            .bind(user_id)
            .bind(place_id)
            .bind(dto.rating)
            .bind(dto.content.trim())
            .bind(&image_ids)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return duplicate_review();
                }
                tracing::error!("Failed to create review: {:?}", e);
                AppError::Database(e)
            })?;

        mark_used(&mut *tx, &image_ids, &[], FileKind::ImageReview).await?;
        recompute_rating(&mut *tx, place_id).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit review: {:?}", e);
            AppError::Database(e)
        })?;

        info!("Review {} created for place {}", review.id, place_id);
        self.files.spawn_cleanup([user_id]);

        self.find_dto(review.id).await
    }

    /// Reviews, newest first unless a filter says otherwise. Returns the page
    /// and the number of matching reviews.
    pub async fn list(&self, query: &ReviewListQuery) -> Result<(Vec<ReviewDto>, i64)> {
        let filter = query.filter.as_deref().and_then(ReviewListFilter::parse);

        let push_conditions = |builder: &mut QueryBuilder<'_, Postgres>| {
            builder.push(" WHERE TRUE");
            if let Some(place_id) = query.place_id {
                builder.push(" AND r.place_id = ").push_bind(place_id);
            }
            if let Some(ReviewListFilter::Rating(rating)) = filter {
                builder.push(" AND r.rating = ").push_bind(rating);
            }
        };

        let mut builder = QueryBuilder::<Postgres>::new(REVIEW_SELECT);
        push_conditions(&mut builder);
        builder.push(match filter {
            Some(ReviewListFilter::RatingDesc) => " ORDER BY r.rating DESC, r.created_at DESC",
            Some(ReviewListFilter::RatingAsc) => " ORDER BY r.rating ASC, r.created_at DESC",
            _ => " ORDER BY r.created_at DESC",
        });
        if let Some(limit) = resolve_limit(query.limit) {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let rows = builder
            .build_query_as::<ReviewRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reviews: {:?}", e);
                AppError::Database(e)
            })?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM place_reviews r");
        push_conditions(&mut count);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count reviews: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((self.to_dtos(rows).await?, total))
    }

    /// The caller's review of a place, if any
    pub async fn my_review(&self, user_id: Uuid, place_id: Uuid) -> Result<Option<ReviewDto>> {
        let sql = format!("{} WHERE r.user_id = $1 AND r.place_id = $2", REVIEW_SELECT);

        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(user_id)
            .bind(place_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load own review: {:?}", e);
                AppError::Database(e)
            })?;

        match row {
            Some(row) => Ok(self.to_dtos(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Every review the caller wrote, newest first, with the reviewed place
    pub async fn my_reviews(&self, user_id: Uuid) -> Result<Vec<MyReviewDto>> {
        let rows = sqlx::query_as::<_, MyReviewRow>(
            r#"
            SELECT r.id, r.rating, r.content, r.image_ids, r.created_at, r.updated_at,
                   p.id AS place_id, p.name AS place_name, f.filename AS cover_filename
            FROM place_reviews r
            JOIN places p ON p.id = r.place_id
            LEFT JOIN files f ON f.id = p.map_image_cover_id
            WHERE r.user_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list own reviews: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|row| MyReviewDto {
                id: row.id,
                rating: row.rating,
                content: row.content,
                image_ids: row.image_ids,
                place: ReviewedPlaceDto {
                    id: row.place_id,
                    name: row.place_name,
                    cover_link: row
                        .cover_filename
                        .as_deref()
                        .map(|f| self.links.map_content(f)),
                },
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    /// Edit the caller's own review
    pub async fn update(
        &self,
        user_id: Uuid,
        review_id: Uuid,
        dto: ReviewRequestDto,
    ) -> Result<ReviewDto> {
        let current = self.find_review(review_id).await?;
        if current.user_id != user_id {
            return Err(review_not_found());
        }

        let image_ids = self
            .own_image_ids(user_id, &dto.image_ids, &current.image_ids)
            .await?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        lock_place(&mut *tx, current.place_id).await?;

        let sql = format!(
            "SELECT {} FROM place_reviews WHERE id = $1 AND user_id = $2",
            PLACE_REVIEW_COLUMNS
        );
        let previous = sqlx::query_as::<_, PlaceReview>(&sql)
            .bind(review_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to reload review: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(review_not_found)?;

        mark_unused(&mut *tx, &previous.image_ids).await?;

        sqlx::query(
            r#"
            UPDATE place_reviews
            SET rating = $2, content = $3, image_ids = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(review_id)
        .bind(dto.rating)
        .bind(dto.content.trim())
        .bind(&image_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update review: {:?}", e);
            AppError::Database(e)
        })?;

        mark_used(&mut *tx, &image_ids, &previous.image_ids, FileKind::ImageReview).await?;
        recompute_rating(&mut *tx, previous.place_id).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit review update: {:?}", e);
            AppError::Database(e)
        })?;

        info!("Review {} updated", review_id);
        self.files.spawn_cleanup([user_id]);

        self.find_dto(review_id).await
    }

    /// Delete a review. Authors delete their own, admins delete any.
    pub async fn delete(&self, user: &AuthenticatedUser, review_id: Uuid) -> Result<()> {
        let current = self.find_review(review_id).await?;
        if !user.can_manage(current.user_id) {
            return Err(AppError::Forbidden(
                "You are not allowed to delete this review".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        lock_place(&mut *tx, current.place_id).await?;

        let sql = format!(
            "DELETE FROM place_reviews WHERE id = $1 RETURNING {}",
            PLACE_REVIEW_COLUMNS
        );
        let removed = sqlx::query_as::<_, PlaceReview>(&sql)
            .bind(review_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete review: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(review_not_found)?;

        mark_unused(&mut *tx, &removed.image_ids).await?;
        recompute_rating(&mut *tx, removed.place_id).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit review deletion: {:?}", e);
            AppError::Database(e)
        })?;

        info!("Review {} deleted by user {}", review_id, user.user_id);
        self.files.spawn_cleanup([removed.user_id]);

        Ok(())
    }

    async fn find_review(&self, review_id: Uuid) -> Result<PlaceReview> {
        let sql = format!(
            "SELECT {} FROM place_reviews WHERE id = $1",
            PLACE_REVIEW_COLUMNS
        );
        sqlx::query_as::<_, PlaceReview>(&sql)
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load review: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(review_not_found)
    }

    async fn find_dto(&self, review_id: Uuid) -> Result<ReviewDto> {
        let sql = format!("{} WHERE r.id = $1", REVIEW_SELECT);

        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load review: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(review_not_found)?;

        self.to_dtos(vec![row])
            .await?
            .pop()
            .ok_or_else(review_not_found)
    }

    /// Keep only ids of files the caller uploaded that are free or already
    /// held by this review
    async fn own_image_ids(
        &self,
        user_id: Uuid,
        requested: &[Uuid],
        held: &[Uuid],
    ) -> Result<Vec<Uuid>> {
        Ok(self
            .files
            .find_user_files(user_id, requested, held)
            .await?
            .into_iter()
            .map(|f| f.id)
            .collect())
    }

    async fn to_dtos(&self, rows: Vec<ReviewRow>) -> Result<Vec<ReviewDto>> {
        let image_ids: Vec<Uuid> = rows.iter().flat_map(|r| r.image_ids.clone()).collect();

        let filenames: HashMap<Uuid, String> = if image_ids.is_empty() {
            HashMap::new()
        } else {
            sqlx::query_as::<_, (Uuid, String)>("SELECT id, filename FROM files WHERE id = ANY($1)")
                .bind(&image_ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to load review images: {:?}", e);
                    AppError::Database(e)
                })?
                .into_iter()
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|row| ReviewDto {
                images: row
                    .image_ids
                    .iter()
                    .filter_map(|id| {
                        filenames
                            .get(id)
                            .map(|filename| ImageDto::new(*id, filename, &self.links))
                    })
                    .collect(),
                user: UserBriefDto::from_brief(
                    UserBrief {
                        id: row.user_id,
                        name: row.author_name,
                        avatar: row.author_avatar,
                    },
                    &self.links,
                ),
                id: row.id,
                place_id: row.place_id,
                rating: row.rating,
                content: row.content,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }
}

fn duplicate_review() -> AppError {
    AppError::Conflict("You have already reviewed this place".to_string())
}

fn review_not_found() -> AppError {
    AppError::NotFound("Review not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::UserRole;
    use crate::modules::storage::MemoryStorage;
    use crate::shared::test_helpers::{seed_file, seed_place, seed_user, session_for, test_links};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn service(pool: &PgPool) -> ReviewService {
        let files = FileService::new(pool.clone(), Arc::new(MemoryStorage::new()), test_links());
        ReviewService::new(pool.clone(), Arc::new(files), test_links())
    }

    fn review(rating: i32, image_ids: Vec<Uuid>) -> ReviewRequestDto {
        ReviewRequestDto {
            rating,
            content: "Tempatnya bersih".to_string(),
            image_ids,
        }
    }

    async fn place_rating(pool: &PgPool, place_id: Uuid) -> f64 {
        sqlx::query_scalar("SELECT rating FROM places WHERE id = $1")
            .bind(place_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn is_used(pool: &PgPool, file_id: Uuid) -> bool {
        sqlx::query_scalar("SELECT used FROM files WHERE id = $1")
            .bind(file_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[test]
    fn test_duplicate_review_is_conflict() {
        assert_eq!(
            duplicate_review().into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_second_review_by_same_user_conflicts(pool: PgPool) {
        let owner_id = seed_user(&pool).await;
        let reviewer_id = seed_user(&pool).await;
        let place_id = seed_place(&pool, owner_id, None).await;
        let service = service(&pool);

        service
            .create(reviewer_id, place_id, review(5, vec![]))
            .await
            .unwrap();

        assert!(matches!(
            service.create(reviewer_id, place_id, review(1, vec![])).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(place_rating(&pool, place_id).await, 5.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_rating_follows_review_writes(pool: PgPool) {
        let owner_id = seed_user(&pool).await;
        let first_id = seed_user(&pool).await;
        let second_id = seed_user(&pool).await;
        let place_id = seed_place(&pool, owner_id, None).await;
        let service = service(&pool);

        let first = service
            .create(first_id, place_id, review(5, vec![]))
            .await
            .unwrap();
        let second = service
            .create(second_id, place_id, review(3, vec![]))
            .await
            .unwrap();
        assert_eq!(place_rating(&pool, place_id).await, 4.0);

        service
            .update(second_id, second.id, review(1, vec![]))
            .await
            .unwrap();
        assert_eq!(place_rating(&pool, place_id).await, 3.0);

        service
            .delete(&session_for(first_id, UserRole::User), first.id)
            .await
            .unwrap();
        assert_eq!(place_rating(&pool, place_id).await, 1.0);

        service
            .delete(&session_for(owner_id, UserRole::Admin), second.id)
            .await
            .unwrap();
        assert_eq!(place_rating(&pool, place_id).await, 0.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_by_other_user_is_not_found(pool: PgPool) {
        let owner_id = seed_user(&pool).await;
        let reviewer_id = seed_user(&pool).await;
        let place_id = seed_place(&pool, owner_id, None).await;
        let service = service(&pool);

        let created = service
            .create(reviewer_id, place_id, review(4, vec![]))
            .await
            .unwrap();

        assert!(matches!(
            service.update(owner_id, created.id, review(1, vec![])).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service
                .delete(&session_for(owner_id, UserRole::User), created.id)
                .await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_review_cannot_share_image_of_own_place(pool: PgPool) {
        let user_id = seed_user(&pool).await;
        let cover_id = seed_file(&pool, user_id, true).await;
        let photo_id = seed_file(&pool, user_id, false).await;
        let place_id = seed_place(&pool, user_id, Some(cover_id)).await;
        let service = service(&pool);

        let created = service
            .create(user_id, place_id, review(5, vec![cover_id, photo_id]))
            .await
            .unwrap();
        let attached: Vec<Uuid> = created.images.iter().map(|i| i.id).collect();
        assert_eq!(attached, vec![photo_id]);
        assert!(is_used(&pool, photo_id).await);

        service
            .delete(&session_for(user_id, UserRole::User), created.id)
            .await
            .unwrap();

        assert!(is_used(&pool, cover_id).await);
        assert!(!is_used(&pool, photo_id).await);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_keeps_images_the_review_already_holds(pool: PgPool) {
        let owner_id = seed_user(&pool).await;
        let reviewer_id = seed_user(&pool).await;
        let place_id = seed_place(&pool, owner_id, None).await;
        let kept_id = seed_file(&pool, reviewer_id, false).await;
        let dropped_id = seed_file(&pool, reviewer_id, false).await;
        let service = service(&pool);

        let created = service
            .create(reviewer_id, place_id, review(4, vec![kept_id, dropped_id]))
            .await
            .unwrap();
        let updated = service
            .update(reviewer_id, created.id, review(4, vec![kept_id]))
            .await
            .unwrap();

        assert_eq!(updated.images.len(), 1);
        assert!(is_used(&pool, kept_id).await);
        assert!(!is_used(&pool, dropped_id).await);
    }
}
