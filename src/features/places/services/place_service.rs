use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::models::PlaceCategory;
use crate::features::files::dtos::ImageDto;
use crate::features::files::models::{File, FileKind};
use crate::features::files::services::{mark_unused, mark_used};
use crate::features::files::FileService;
use crate::features::places::dtos::{
    CategoryBriefDto, ImageSource, PlaceCardDto, PlaceDetailDto, PlaceImageDto, PlaceListFilter,
    PlaceListItemDto, PlaceListQuery, PlaceRequestDto,
};
use crate::features::places::geo::Coordinate;
use crate::features::places::models::{
    OpeningHoursDay, Place, PlaceCardRow, PlaceStatus, PLACE_CARD_SELECT,
};
use crate::features::places::services::{hashtags, lock_place};
use crate::features::users::dtos::UserBriefDto;
use crate::features::users::models::{UserBrief, UserRole};
use crate::shared::constants::{MIN_PLACE_IMAGES, MIN_REVIEWS_TO_SUBMIT_PLACE, OPENING_HOURS_DAYS};
use crate::shared::links::MediaLinks;
use crate::shared::query::{contains_pattern, keyword};
use crate::shared::types::resolve_limit;
use crate::shared::validation::TIME_OF_DAY_REGEX;

/// A submission that passed every check and is ready to be written
struct ValidatedPlace {
    coordinate: Coordinate,
    images: Vec<File>,
    cover: File,
    opening_hours: Vec<OpeningHoursDay>,
    hashtags: Vec<String>,
}

#[derive(Debug, FromRow)]
struct ImageRow {
    id: Uuid,
    filename: String,
    created_at: DateTime<Utc>,
    uploader_id: Uuid,
    uploader_name: String,
    uploader_avatar: Option<String>,
}

impl ImageRow {
    fn into_dto(self, source: ImageSource, links: &MediaLinks) -> PlaceImageDto {
        let image = ImageDto::new(self.id, &self.filename, links);
        PlaceImageDto {
            id: image.id,
            filename: image.filename,
            link: image.link,
            source,
            uploaded_by: UserBriefDto::from_brief(
                UserBrief {
                    id: self.uploader_id,
                    name: self.uploader_name,
                    avatar: self.uploader_avatar,
                },
                links,
            ),
            created_at: self.created_at,
        }
    }
}

/// Service for place submissions and place listings
pub struct PlaceService {
    pool: PgPool,
    files: Arc<FileService>,
    links: MediaLinks,
}

impl PlaceService {
    pub fn new(pool: PgPool, files: Arc<FileService>, links: MediaLinks) -> Self {
        Self { pool, files, links }
    }

    /// Submit a new place. It is published immediately.
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: PlaceRequestDto,
    ) -> Result<PlaceDetailDto> {
        if user.role == UserRole::User {
            let reviews = self.count_user_reviews(user.user_id).await?;
            if reviews < MIN_REVIEWS_TO_SUBMIT_PLACE {
                return Err(AppError::BadRequest(format!(
                    "You need to write at least {} reviews before adding a place",
                    MIN_REVIEWS_TO_SUBMIT_PLACE
                )));
            }
        }

        let place = self.validate_submission(user.user_id, &dto, &[]).await?;
        let ar_cover = self.files.create_ar_cover(&place.cover).await?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let image_ids: Vec<Uuid> = place.images.iter().map(|f| f.id).collect();

        let place_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO places (
                user_id, status, name, description, category_id,
                map_image_ids, map_image_cover_id, map_ar_image_cover_id,
                latitude, longitude, address, opening_hours, website, phone, price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
            "#,
        )
        .bind(user.user_id)
        .bind(PlaceStatus::Published)
        .bind(dto.name.trim())
        .bind(&dto.description)
        .bind(dto.category_id)
        .bind(&image_ids)
        .bind(place.cover.id)
        .bind(ar_cover.id)
        .bind(place.coordinate.latitude)
        .bind(place.coordinate.longitude)
        .bind(&dto.address)
        .bind(Json(&place.opening_hours))
        .bind(&dto.website)
        .bind(&dto.phone)
        .bind(dto.price)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create place: {:?}", e);
            AppError::Database(e)
        })?;

        hashtags::replace_place_hashtags(&mut *tx, place_id, &place.hashtags).await?;

        let mut used = image_ids;
        used.push(ar_cover.id);
        mark_used(&mut *tx, &used, &[], FileKind::ImageMap).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit place creation: {:?}", e);
            AppError::Database(e)
        })?;

        info!("Place {} created by user {}", place_id, user.user_id);
        self.files.spawn_cleanup([user.user_id]);

        self.detail(place_id).await
    }

    /// Edit a place. Owners edit their own places, admins edit any.
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        place_id: Uuid,
        dto: PlaceRequestDto,
    ) -> Result<PlaceDetailDto> {
        let current = self.find_place(place_id).await?;
        if !user.can_manage(current.user_id) {
            return Err(AppError::Forbidden(
                "You do not have access to this place".to_string(),
            ));
        }

        // Images always belong to the owner, even when an admin edits
        let place = self
            .validate_submission(current.user_id, &dto, &current.file_ids())
            .await?;

        let new_ar_cover = match current.map_ar_image_cover_id {
            Some(_) if current.map_image_cover_id == Some(place.cover.id) => None,
            _ => Some(self.files.create_ar_cover(&place.cover).await?),
        };

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        // Re-read under the lock; the unlocked copy only served the access check
        let locked = lock_place(&mut *tx, place_id).await?;

        let image_ids: Vec<Uuid> = place.images.iter().map(|f| f.id).collect();
        let ar_cover_id = new_ar_cover
            .as_ref()
            .map(|f| f.id)
            .or(locked.map_ar_image_cover_id);

        let mut kept: HashSet<Uuid> = image_ids.iter().copied().collect();
        kept.extend(ar_cover_id);
        let released: Vec<Uuid> = locked
            .file_ids()
            .into_iter()
            .filter(|id| !kept.contains(id))
            .collect();

        sqlx::query(
            r#"
            UPDATE places
            SET status = $2, name = $3, description = $4, category_id = $5,
                map_image_ids = $6, map_image_cover_id = $7, map_ar_image_cover_id = $8,
                latitude = $9, longitude = $10, address = $11, opening_hours = $12,
                website = $13, phone = $14, price = $15, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(place_id)
        .bind(PlaceStatus::Published)
        .bind(dto.name.trim())
        .bind(&dto.description)
        .bind(dto.category_id)
        .bind(&image_ids)
        .bind(place.cover.id)
        .bind(ar_cover_id)
        .bind(place.coordinate.latitude)
        .bind(place.coordinate.longitude)
        .bind(&dto.address)
        .bind(Json(&place.opening_hours))
        .bind(&dto.website)
        .bind(&dto.phone)
        .bind(dto.price)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update place: {:?}", e);
            AppError::Database(e)
        })?;

        hashtags::replace_place_hashtags(&mut *tx, place_id, &place.hashtags).await?;

        mark_unused(&mut *tx, &released).await?;
        let mut used = image_ids;
        used.extend(ar_cover_id);
        mark_used(&mut *tx, &used, &locked.file_ids(), FileKind::ImageMap).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit place update: {:?}", e);
            AppError::Database(e)
        })?;

        info!(
            "Place {} updated by user {} ({} files released)",
            place_id,
            user.user_id,
            released.len()
        );
        self.files.spawn_cleanup([locked.user_id]);

        self.detail(place_id).await
    }

    /// Delete a place together with its reviews and engagement
    pub async fn delete(&self, user: &AuthenticatedUser, place_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let place = lock_place(&mut *tx, place_id).await?;
        if !user.can_manage(place.user_id) {
            return Err(AppError::Forbidden(
                "You are not allowed to delete this place".to_string(),
            ));
        }

        let affected_users = delete_place_in_tx(&mut *tx, &place).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit place deletion: {:?}", e);
            AppError::Database(e)
        })?;

        info!("Place {} deleted by user {}", place_id, user.user_id);
        self.files.spawn_cleanup(affected_users);

        Ok(())
    }

    /// Admin listing with sort filter and name keyword. Returns the page and
    /// the number of places matching the keyword.
    pub async fn list(&self, query: &PlaceListQuery) -> Result<(Vec<PlaceListItemDto>, i64)> {
        let filter = query.filter.as_deref().and_then(PlaceListFilter::parse);
        let keyword = keyword(query.keyword.as_deref());
        let limit = resolve_limit(query.limit);

        let mut builder = QueryBuilder::<Postgres>::new(PLACE_CARD_SELECT);
        builder.push(" WHERE TRUE");
        if let Some(keyword) = keyword {
            builder
                .push(" AND p.name ILIKE ")
                .push_bind(contains_pattern(keyword));
        }
        builder
            .push(" ORDER BY ")
            .push(PlaceListFilter::order_by(filter))
            .push(", p.id");
        if let Some(limit) = limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let rows = builder
            .build_query_as::<PlaceCardRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list places: {:?}", e);
                AppError::Database(e)
            })?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM places p WHERE TRUE");
        if let Some(keyword) = keyword {
            count
                .push(" AND p.name ILIKE ")
                .push_bind(contains_pattern(keyword));
        }
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count places: {:?}", e);
                AppError::Database(e)
            })?;

        let owner_ids: Vec<Uuid> = rows.iter().map(|r| r.user_id).collect();
        let owners = self.find_user_briefs(&owner_ids).await?;

        let items = rows
            .into_iter()
            .map(|row| {
                let owner = owners.get(&row.user_id).cloned().unwrap_or(UserBrief {
                    id: row.user_id,
                    name: String::new(),
                    avatar: None,
                });

                PlaceListItemDto {
                    owner: UserBriefDto::from_brief(owner, &self.links),
                    place: PlaceCardDto::from_row(row, &self.links, None),
                }
            })
            .collect();

        Ok((items, total))
    }

    /// Places submitted by the caller, most recently edited first
    pub async fn my_places(&self, user_id: Uuid) -> Result<Vec<PlaceCardDto>> {
        let sql = format!(
            "{} WHERE p.user_id = $1 ORDER BY p.updated_at DESC",
            PLACE_CARD_SELECT
        );

        let rows = sqlx::query_as::<_, PlaceCardRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list user places: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(self.cards(rows))
    }

    /// Places the caller bookmarked, most recent bookmark first
    pub async fn bookmarks(&self, user_id: Uuid) -> Result<Vec<PlaceCardDto>> {
        let sql = format!(
            "{} JOIN place_bookmarks b ON b.place_id = p.id \
             WHERE b.user_id = $1 ORDER BY b.created_at DESC",
            PLACE_CARD_SELECT
        );

        let rows = sqlx::query_as::<_, PlaceCardRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list bookmarks: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(self.cards(rows))
    }

    pub async fn detail(&self, place_id: Uuid) -> Result<PlaceDetailDto> {
        let place = self.find_place(place_id).await?;

        let category = sqlx::query_as::<_, PlaceCategory>(
            "SELECT * FROM place_categories WHERE id = $1",
        )
        .bind(place.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load place category: {:?}", e);
            AppError::Database(e)
        })?;

        let owner = self
            .find_user_briefs(&[place.user_id])
            .await?
            .remove(&place.user_id)
            .ok_or_else(|| AppError::NotFound("Place owner not found".to_string()))?;

        let filenames: HashMap<Uuid, String> = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, filename FROM files WHERE id = ANY($1)",
        )
        .bind(place.file_ids())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load place files: {:?}", e);
            AppError::Database(e)
        })?
        .into_iter()
        .collect();

        let image = |id: Option<Uuid>| {
            id.and_then(|id| {
                filenames
                    .get(&id)
                    .map(|filename| ImageDto::new(id, filename, &self.links))
            })
        };

        let hashtags: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT h.name FROM hashtags h
            JOIN place_hashtags ph ON ph.hashtag_id = h.id
            WHERE ph.place_id = $1
            ORDER BY h.name
            "#,
        )
        .bind(place_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load place hashtags: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(PlaceDetailDto {
            id: place.id,
            status: place.status,
            name: place.name,
            description: place.description,
            latitude: place.latitude,
            longitude: place.longitude,
            address: place.address,
            opening_hours: place.opening_hours.0,
            website: place.website,
            phone: place.phone,
            price: place.price,
            rating: place.rating,
            views: place.views,
            like: place.likes,
            dislike: place.dislikes,
            saved: place.saved,
            category: CategoryBriefDto {
                id: category.id,
                name: category.name,
                map_marker_link: self.links.map_marker(&category.map_marker),
            },
            owner: UserBriefDto::from_brief(owner, &self.links),
            images: place
                .map_image_ids
                .iter()
                .filter_map(|id| image(Some(*id)))
                .collect(),
            cover: image(place.map_image_cover_id),
            ar_cover: image(place.map_ar_image_cover_id),
            hashtags,
            created_at: place.created_at,
            updated_at: place.updated_at,
        })
    }

    /// Gallery of a place: its own images in submission order, then review
    /// images with the newest review first
    pub async fn images(&self, place_id: Uuid) -> Result<Vec<PlaceImageDto>> {
        self.find_place(place_id).await?;

        let place_images = sqlx::query_as::<_, ImageRow>(
            r#"
            SELECT f.id, f.filename, f.created_at,
                   u.id AS uploader_id, u.name AS uploader_name, u.avatar AS uploader_avatar
            FROM places p
            CROSS JOIN LATERAL UNNEST(p.map_image_ids) WITH ORDINALITY AS img(file_id, ord)
            JOIN files f ON f.id = img.file_id
            JOIN users u ON u.id = f.user_id
            WHERE p.id = $1
            ORDER BY img.ord
            "#,
        )
        .bind(place_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load place images: {:?}", e);
            AppError::Database(e)
        })?;

        let review_images = sqlx::query_as::<_, ImageRow>(
            r#"
            SELECT f.id, f.filename, f.created_at,
                   u.id AS uploader_id, u.name AS uploader_name, u.avatar AS uploader_avatar
            FROM place_reviews r
            CROSS JOIN LATERAL UNNEST(r.image_ids) WITH ORDINALITY AS img(file_id, ord)
            JOIN files f ON f.id = img.file_id
            JOIN users u ON u.id = r.user_id
            WHERE r.place_id = $1
            ORDER BY r.created_at DESC, img.ord
            "#,
        )
        .bind(place_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load review images: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(place_images
            .into_iter()
            .map(|row| row.into_dto(ImageSource::Place, &self.links))
            .chain(
                review_images
                    .into_iter()
                    .map(|row| row.into_dto(ImageSource::Review, &self.links)),
            )
            .collect())
    }

    async fn validate_submission(
        &self,
        image_owner: Uuid,
        dto: &PlaceRequestDto,
        held: &[Uuid],
    ) -> Result<ValidatedPlace> {
        let coordinate = Coordinate::new(dto.latitude, dto.longitude)?;

        let category_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM place_categories WHERE id = $1)")
                .bind(dto.category_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to check category: {:?}", e);
                    AppError::Database(e)
                })?;
        if !category_exists {
            return Err(AppError::BadRequest("Place category not found".to_string()));
        }

        let images = self
            .files
            .find_user_files(image_owner, &dto.map_image_ids, held)
            .await?;
        if images.len() < MIN_PLACE_IMAGES {
            return Err(AppError::BadRequest(format!(
                "Add at least {} place images",
                MIN_PLACE_IMAGES
            )));
        }

        let cover = images
            .iter()
            .find(|f| f.id == dto.map_image_cover_id)
            .cloned()
            .ok_or_else(|| AppError::BadRequest("Cover image not found".to_string()))?;

        let opening_hours = normalize_opening_hours(dto.opening_hours.clone())?;

        debug!(
            "Place submission validated: {} images, cover {}",
            images.len(),
            cover.id
        );

        Ok(ValidatedPlace {
            coordinate,
            images,
            cover,
            opening_hours,
            hashtags: hashtags::normalize(&dto.hashtags),
        })
    }

    async fn find_place(&self, place_id: Uuid) -> Result<Place> {
        sqlx::query_as::<_, Place>("SELECT * FROM places WHERE id = $1")
            .bind(place_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load place: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Place not found".to_string()))
    }

    async fn count_user_reviews(&self, user_id: Uuid) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM place_reviews WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count user reviews: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_user_briefs(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserBrief>> {
        let users = sqlx::query_as::<_, UserBrief>(
            "SELECT id, name, avatar FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load users: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    fn cards(&self, rows: Vec<PlaceCardRow>) -> Vec<PlaceCardDto> {
        rows.into_iter()
            .map(|row| PlaceCardDto::from_row(row, &self.links, None))
            .collect()
    }
}

/// Delete a locked place and everything hanging off it.
///
/// Its own files and its reviews' images are released. Returns the users whose
/// files were released so the caller can schedule cleanup after commit.
pub async fn delete_place_in_tx(conn: &mut PgConnection, place: &Place) -> Result<Vec<Uuid>> {
    let reviews = sqlx::query_as::<_, (Uuid, Vec<Uuid>)>(
        "DELETE FROM place_reviews WHERE place_id = $1 RETURNING user_id, image_ids",
    )
    .bind(place.id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to delete place reviews: {:?}", e);
        AppError::Database(e)
    })?;

    for table in ["place_reactions", "place_bookmarks", "place_hashtags"] {
        sqlx::query(&format!("DELETE FROM {} WHERE place_id = $1", table))
            .bind(place.id)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete from {}: {:?}", table, e);
                AppError::Database(e)
            })?;
    }

    sqlx::query("DELETE FROM places WHERE id = $1")
        .bind(place.id)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete place: {:?}", e);
            AppError::Database(e)
        })?;

    let mut released = place.file_ids();
    let mut affected_users = vec![place.user_id];
    for (user_id, image_ids) in reviews {
        released.extend(image_ids);
        affected_users.push(user_id);
    }
    mark_unused(conn, &released).await?;

    debug!(
        "Place {} removed, {} files released",
        place.id,
        released.len()
    );

    Ok(affected_users)
}

/// Check the weekly schedule and pin each entry's `day_index` to its position
fn normalize_opening_hours(days: Vec<OpeningHoursDay>) -> Result<Vec<OpeningHoursDay>> {
    if days.len() != OPENING_HOURS_DAYS {
        return Err(AppError::BadRequest(format!(
            "Opening hours must list exactly {} days",
            OPENING_HOURS_DAYS
        )));
    }

    days.into_iter()
        .enumerate()
        .map(|(index, mut day)| {
            day.day_index = index as i32;

            let needs_times = !day.closed && !day.full_opening_hours;
            if needs_times
                && !(TIME_OF_DAY_REGEX.is_match(&day.opening_hours)
                    && TIME_OF_DAY_REGEX.is_match(&day.closing_hours))
            {
                return Err(AppError::BadRequest(format!(
                    "Invalid opening hours for day {}",
                    index
                )));
            }

            Ok(day)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_day(opening: &str, closing: &str) -> OpeningHoursDay {
        OpeningHoursDay {
            day_index: 99,
            closed: false,
            full_opening_hours: false,
            opening_hours: opening.to_string(),
            closing_hours: closing.to_string(),
        }
    }

    fn week() -> Vec<OpeningHoursDay> {
        vec![open_day("08:00", "17:00"); OPENING_HOURS_DAYS]
    }

    #[test]
    fn test_opening_hours_day_index_follows_position() {
        let days = normalize_opening_hours(week()).unwrap();
        let indexes: Vec<i32> = days.iter().map(|d| d.day_index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_opening_hours_requires_seven_days() {
        let mut six = week();
        six.pop();
        assert!(matches!(
            normalize_opening_hours(six),
            Err(AppError::BadRequest(_))
        ));

        let mut eight = week();
        eight.push(open_day("08:00", "17:00"));
        assert!(normalize_opening_hours(eight).is_err());
    }

    #[test]
    fn test_opening_hours_time_format() {
        let mut days = week();
        days[3] = open_day("8am", "17:00");
        assert!(normalize_opening_hours(days).is_err());

        // Times are ignored for closed and 24h days
        let mut days = week();
        days[0] = OpeningHoursDay {
            closed: true,
            ..open_day("", "")
        };
        days[6] = OpeningHoursDay {
            full_opening_hours: true,
            ..open_day("", "")
        };
        assert!(normalize_opening_hours(days).is_ok());
    }
}
