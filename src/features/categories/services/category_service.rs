use std::collections::HashMap;
use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::database::is_foreign_key_violation;
use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CategoryFormDto, CategoryResponseDto};
use crate::features::categories::models::PlaceCategory;
use crate::features::files::dtos::UploadedFile;
use crate::features::places::dtos::PlaceCardDto;
use crate::features::places::models::{PlaceCardRow, PlaceStatus, PLACE_CARD_SELECT};
use crate::modules::storage::{content_type_for, ObjectStorage};
use crate::shared::constants::{MAP_MARKERS_PREFIX, QUALITY_GATE_MAX_DISLIKES};
use crate::shared::links::{object_key, stored_filename, MediaLinks};

/// Service for place categories and their map markers
pub struct CategoryService {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
    links: MediaLinks,
}

impl CategoryService {
    pub fn new(pool: PgPool, storage: Arc<dyn ObjectStorage>, links: MediaLinks) -> Self {
        Self {
            pool,
            storage,
            links,
        }
    }

    pub async fn create(
        &self,
        form: CategoryFormDto,
        marker: UploadedFile,
        extension: &str,
    ) -> Result<CategoryResponseDto> {
        let map_marker = self.store_marker(marker, extension).await?;

        let created = sqlx::query_as::<_, PlaceCategory>(
            r#"
            INSERT INTO place_categories (name, description, map_marker)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(form.name.trim())
        .bind(form.description.trim())
        .bind(&map_marker)
        .fetch_one(&self.pool)
        .await;

        let category = match created {
            Ok(category) => category,
            Err(e) => {
                tracing::error!("Failed to create category: {:?}", e);
                self.delete_marker(&map_marker).await;
                return Err(AppError::Database(e));
            }
        };

        info!("Category {} created", category.id);
        Ok(CategoryResponseDto::from_category(category, &self.links))
    }

    /// Categories, most recently edited first
    pub async fn list(&self, with_popular_place: bool) -> Result<Vec<CategoryResponseDto>> {
        let categories = sqlx::query_as::<_, PlaceCategory>(
            "SELECT * FROM place_categories ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        let mut popular = if with_popular_place {
            self.popular_places().await?
        } else {
            HashMap::new()
        };

        Ok(categories
            .into_iter()
            .map(|category| {
                let place = popular.remove(&category.id);
                let mut dto = CategoryResponseDto::from_category(category, &self.links);
                dto.popular_place = place;
                dto
            })
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<CategoryResponseDto> {
        let category = self.find(id).await?;
        Ok(CategoryResponseDto::from_category(category, &self.links))
    }

    /// Update name and description, replacing the marker when a new one is sent
    pub async fn update(
        &self,
        id: Uuid,
        form: CategoryFormDto,
        marker: Option<(UploadedFile, String)>,
    ) -> Result<CategoryResponseDto> {
        let current = self.find(id).await?;

        let new_marker = match marker {
            Some((upload, extension)) => Some(self.store_marker(upload, &extension).await?),
            None => None,
        };

        let updated = sqlx::query_as::<_, PlaceCategory>(
            r#"
            UPDATE place_categories
            SET name = $2, description = $3, map_marker = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(form.name.trim())
        .bind(form.description.trim())
        .bind(new_marker.as_deref().unwrap_or(&current.map_marker))
        .fetch_optional(&self.pool)
        .await;

        let category = match updated {
            Ok(Some(category)) => category,
            Ok(None) => {
                if let Some(marker) = &new_marker {
                    self.delete_marker(marker).await;
                }
                return Err(category_not_found());
            }
            Err(e) => {
                tracing::error!("Failed to update category: {:?}", e);
                if let Some(marker) = &new_marker {
                    self.delete_marker(marker).await;
                }
                return Err(AppError::Database(e));
            }
        };

        if new_marker.is_some() {
            self.delete_marker(&current.map_marker).await;
        }

        info!("Category {} updated", id);
        Ok(CategoryResponseDto::from_category(category, &self.links))
    }

    /// Delete a category no place refers to
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let category = self.find(id).await?;

        let in_use: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM places WHERE category_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to check category usage: {:?}", e);
                    AppError::Database(e)
                })?;
        if in_use {
            return Err(category_in_use());
        }

        sqlx::query("DELETE FROM place_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                // A place may have been added since the check
                if is_foreign_key_violation(&e) {
                    return category_in_use();
                }
                tracing::error!("Failed to delete category: {:?}", e);
                AppError::Database(e)
            })?;

        self.delete_marker(&category.map_marker).await;

        info!("Category {} deleted", id);
        Ok(())
    }

    /// Best gated place of every category that has one
    async fn popular_places(&self) -> Result<HashMap<Uuid, PlaceCardDto>> {
        let sql = format!(
            r#"{} WHERE p.id IN (
                SELECT best.id FROM place_categories pc
                CROSS JOIN LATERAL (
                    SELECT id FROM places
                    WHERE category_id = pc.id AND status = $1 AND dislikes < $2
                    ORDER BY rating DESC, likes DESC, saved DESC
                    LIMIT 1
                ) best
            )"#,
            PLACE_CARD_SELECT
        );

        let rows = sqlx::query_as::<_, PlaceCardRow>(&sql)
            .bind(PlaceStatus::Published)
            .bind(QUALITY_GATE_MAX_DISLIKES)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load popular places: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows
            .into_iter()
            .map(|row| (row.category_id, PlaceCardDto::from_row(row, &self.links, None)))
            .collect())
    }

    async fn find(&self, id: Uuid) -> Result<PlaceCategory> {
        sqlx::query_as::<_, PlaceCategory>("SELECT * FROM place_categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load category: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(category_not_found)
    }

    async fn store_marker(&self, marker: UploadedFile, extension: &str) -> Result<String> {
        let filename = stored_filename("map-marker", extension);
        self.storage
            .upload(
                &object_key(MAP_MARKERS_PREFIX, &filename),
                marker.data,
                content_type_for(&filename),
            )
            .await?;
        Ok(filename)
    }

    /// Best effort; a leftover marker object only costs storage
    async fn delete_marker(&self, filename: &str) {
        if let Err(e) = self
            .storage
            .delete(&object_key(MAP_MARKERS_PREFIX, filename))
            .await
        {
            warn!("Failed to delete map marker '{}': {}", filename, e);
        }
    }
}

fn category_not_found() -> AppError {
    AppError::NotFound("Place category not found".to_string())
}

fn category_in_use() -> AppError {
    AppError::Conflict("Place category is still used by places".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::MemoryStorage;
    use crate::shared::test_helpers::{lazy_pool, test_links};

    #[tokio::test]
    async fn test_store_marker_uses_marker_prefix() {
        let storage = Arc::new(MemoryStorage::new());
        let service = CategoryService::new(lazy_pool(), storage.clone(), test_links());

        let filename = service
            .store_marker(
                UploadedFile {
                    data: vec![137, 80, 78, 71],
                    file_name: "pin.png".to_string(),
                },
                "png",
            )
            .await
            .unwrap();

        assert!(filename.starts_with("map-marker-"));
        let stored = storage
            .download(&object_key(MAP_MARKERS_PREFIX, &filename))
            .await
            .unwrap();
        assert_eq!(stored, vec![137, 80, 78, 71]);

        service.delete_marker(&filename).await;
        assert!(storage
            .download(&object_key(MAP_MARKERS_PREFIX, &filename))
            .await
            .is_err());
    }
}
