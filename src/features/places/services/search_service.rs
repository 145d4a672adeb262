use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::places::dtos::PlaceCardDto;
use crate::features::places::geo::{
    rank_by_distance, Coordinate, Ranked, AR_LIMIT, KEYWORD_CANDIDATE_LIMIT,
    KEYWORD_RADIUS_METERS, NEARBY_PLACE_LIMIT, NEARBY_PLACE_RADIUS_METERS, NEAREST_LIMIT,
};
use crate::features::places::models::{Place, PlaceCardRow, PlaceStatus, PLACE_CARD_SELECT};
use crate::shared::constants::{HIGHLIGHT_LIMIT, QUALITY_GATE_MAX_DISLIKES};
use crate::shared::links::MediaLinks;
use crate::shared::query::{contains_pattern, keyword};

/// Discovery queries. Every result passes the quality gate: published and
/// under the dislike threshold.
pub struct SearchService {
    pool: PgPool,
    links: MediaLinks,
}

impl SearchService {
    pub fn new(pool: PgPool, links: MediaLinks) -> Self {
        Self { pool, links }
    }

    /// Best rated places
    pub async fn highlight(&self) -> Result<Vec<PlaceCardDto>> {
        let sql = format!(
            "{} WHERE p.status = $1 AND p.dislikes < $2 \
             ORDER BY p.rating DESC, p.likes DESC, p.saved DESC LIMIT $3",
            PLACE_CARD_SELECT
        );

        let rows = sqlx::query_as::<_, PlaceCardRow>(&sql)
            .bind(PlaceStatus::Published)
            .bind(QUALITY_GATE_MAX_DISLIKES)
            .bind(HIGHLIGHT_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load highlighted places: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows
            .into_iter()
            .map(|row| PlaceCardDto::from_row(row, &self.links, None))
            .collect())
    }

    /// Closest places to the caller, no radius
    pub async fn nearest(&self, origin: Coordinate) -> Result<Vec<PlaceCardDto>> {
        let candidates = self.gated_candidates().await?;
        Ok(self.ranked_cards(origin, candidates, None, NEAREST_LIMIT))
    }

    /// Places of the same category within 100 km of a reference place
    pub async fn nearby_place(&self, place_id: Option<Uuid>) -> Result<Vec<PlaceCardDto>> {
        let place_id =
            place_id.ok_or_else(|| AppError::BadRequest("placeId is required".to_string()))?;

        let reference = sqlx::query_as::<_, Place>("SELECT * FROM places WHERE id = $1")
            .bind(place_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load reference place: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Place not found".to_string()))?;

        let sql = format!(
            "{} WHERE p.status = $1 AND p.dislikes < $2 AND p.category_id = $3 AND p.id <> $4",
            PLACE_CARD_SELECT
        );

        let candidates = sqlx::query_as::<_, PlaceCardRow>(&sql)
            .bind(PlaceStatus::Published)
            .bind(QUALITY_GATE_MAX_DISLIKES)
            .bind(reference.category_id)
            .bind(reference.id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load nearby candidates: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(self.ranked_cards(
            reference.coordinate(),
            candidates,
            Some(NEARBY_PLACE_RADIUS_METERS),
            NEARBY_PLACE_LIMIT,
        ))
    }

    /// Keyword search around the caller.
    ///
    /// The keyword matches place name or description, or picks up to three
    /// categories by name or description. The best rated matches are then
    /// ranked by distance within 300 km.
    pub async fn map_search(
        &self,
        raw_keyword: Option<&str>,
        origin: Coordinate,
    ) -> Result<Vec<PlaceCardDto>> {
        let keyword = keyword(raw_keyword)
            .map(str::to_lowercase)
            .ok_or_else(|| AppError::BadRequest("Keyword is required".to_string()))?;
        let pattern = contains_pattern(&keyword);

        let category_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM place_categories
            WHERE name ILIKE $1 OR description ILIKE $1
            ORDER BY name
            LIMIT 3
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to match categories: {:?}", e);
            AppError::Database(e)
        })?;

        let sql = format!(
            "{} WHERE p.status = $1 AND p.dislikes < $2 \
             AND (p.name ILIKE $3 OR p.description ILIKE $3 OR p.category_id = ANY($4)) \
             ORDER BY p.rating DESC, p.likes DESC LIMIT $5",
            PLACE_CARD_SELECT
        );

        let candidates = sqlx::query_as::<_, PlaceCardRow>(&sql)
            .bind(PlaceStatus::Published)
            .bind(QUALITY_GATE_MAX_DISLIKES)
            .bind(&pattern)
            .bind(&category_ids)
            .bind(KEYWORD_CANDIDATE_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search places: {:?}", e);
                AppError::Database(e)
            })?;

        debug!(
            "Map search '{}': {} categories, {} candidates",
            keyword,
            category_ids.len(),
            candidates.len()
        );

        let max_results = candidates.len();
        Ok(self.ranked_cards(
            origin,
            candidates,
            Some(KEYWORD_RADIUS_METERS),
            max_results,
        ))
    }

    /// The three closest places, for the AR view
    pub async fn ar_map_search(&self, origin: Coordinate) -> Result<Vec<PlaceCardDto>> {
        let candidates = self.gated_candidates().await?;
        Ok(self.ranked_cards(origin, candidates, None, AR_LIMIT))
    }

    async fn gated_candidates(&self) -> Result<Vec<PlaceCardRow>> {
        let sql = format!(
            "{} WHERE p.status = $1 AND p.dislikes < $2",
            PLACE_CARD_SELECT
        );

        sqlx::query_as::<_, PlaceCardRow>(&sql)
            .bind(PlaceStatus::Published)
            .bind(QUALITY_GATE_MAX_DISLIKES)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load place candidates: {:?}", e);
                AppError::Database(e)
            })
    }

    fn ranked_cards(
        &self,
        origin: Coordinate,
        candidates: Vec<PlaceCardRow>,
        radius_meters: Option<f64>,
        max_results: usize,
    ) -> Vec<PlaceCardDto> {
        rank_by_distance(
            origin,
            candidates.into_iter().map(|row| {
                let position = row.coordinate();
                (row, position)
            }),
            radius_meters,
            max_results,
        )
        .into_iter()
        .map(|Ranked { item, distance_meters }| {
            PlaceCardDto::from_row(item, &self.links, Some(distance_meters))
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{seed_place, seed_user, test_links};

    async fn set_dislikes(pool: &PgPool, place_id: Uuid, dislikes: i64) {
        sqlx::query("UPDATE places SET dislikes = $2 WHERE id = $1")
            .bind(place_id)
            .bind(dislikes)
            .execute(pool)
            .await
            .unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_quality_gate_on_discovery(pool: PgPool) {
        let owner_id = seed_user(&pool).await;
        let borderline = seed_place(&pool, owner_id, None).await;
        let disliked = seed_place(&pool, owner_id, None).await;
        let draft = seed_place(&pool, owner_id, None).await;
        set_dislikes(&pool, borderline, QUALITY_GATE_MAX_DISLIKES - 1).await;
        set_dislikes(&pool, disliked, QUALITY_GATE_MAX_DISLIKES).await;
        sqlx::query("UPDATE places SET status = 'draft' WHERE id = $1")
            .bind(draft)
            .execute(&pool)
            .await
            .unwrap();

        let service = SearchService::new(pool.clone(), test_links());
        let origin = Coordinate::new(-6.2, 106.8).unwrap();

        let highlighted: Vec<Uuid> = service
            .highlight()
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        let nearest: Vec<Uuid> = service
            .nearest(origin)
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();

        for ids in [highlighted, nearest] {
            assert_eq!(ids, vec![borderline]);
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_map_search_matches_keyword_within_radius(pool: PgPool) {
        let owner_id = seed_user(&pool).await;
        let place_id = seed_place(&pool, owner_id, None).await;
        let service = SearchService::new(pool.clone(), test_links());

        let near = Coordinate::new(-6.21, 106.81).unwrap();
        let found = service.map_search(Some("  PANTAI "), near).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, place_id);

        let far = Coordinate::new(3.59, 98.67).unwrap();
        assert!(service.map_search(Some("pantai"), far).await.unwrap().is_empty());

        assert!(matches!(
            service.map_search(Some("   "), near).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
