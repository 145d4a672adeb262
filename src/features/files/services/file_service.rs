use std::collections::HashSet;
use std::sync::Arc;

use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{FileResponseDto, UploadedFile};
use crate::features::files::models::{File, FileKind};
use crate::features::files::services::image_processing::{center_square_crop, extension_for};
use crate::modules::storage::{content_type_for, ObjectStorage};
use crate::shared::constants::{MAP_CONTENTS_PREFIX, UNUSED_FILE_GRACE_MINUTES};
use crate::shared::links::{object_key, stored_filename, MediaLinks};

/// Service for uploaded images and their used/unused lifecycle
pub struct FileService {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
    links: MediaLinks,
}

impl FileService {
    pub fn new(pool: PgPool, storage: Arc<dyn ObjectStorage>, links: MediaLinks) -> Self {
        Self {
            pool,
            storage,
            links,
        }
    }

    /// Store a place or review image. The row starts unused until a place or
    /// review claims it.
    pub async fn upload_map_content(
        &self,
        user_id: Uuid,
        upload: UploadedFile,
        extension: &str,
    ) -> Result<FileResponseDto> {
        let filename = stored_filename("map-content", extension);
        let size = upload.data.len() as i64;
        let mimetype = content_type_for(&filename);

        self.storage
            .upload(&object_key(MAP_CONTENTS_PREFIX, &filename), upload.data, mimetype)
            .await?;

        debug!("Map content uploaded to storage: {}", filename);

        let file = self
            .insert_file(user_id, &upload.file_name, &filename, size, mimetype)
            .await?;

        info!(
            "File metadata saved: id={}, filename={}, size={}",
            file.id, file.filename, file.size
        );

        Ok(FileResponseDto::from_file(file, &self.links))
    }

    /// Files among `ids` that belong to `user_id` and can be attached, oldest
    /// first. A file is attachable while unused or when it is already in
    /// `held`, the files of the place or review being edited. Foreign, unknown
    /// and taken ids are dropped.
    pub async fn find_user_files(
        &self,
        user_id: Uuid,
        ids: &[Uuid],
        held: &[Uuid],
    ) -> Result<Vec<File>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, File>(
            r#"
            SELECT * FROM files
            WHERE user_id = $1 AND id = ANY($2)
              AND (used = FALSE OR id = ANY($3))
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(ids)
        .bind(held)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load user files: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Derive the AR cover: a centred square crop of `cover`, stored as a new
    /// unused file owned by the same user
    pub async fn create_ar_cover(&self, cover: &File) -> Result<File> {
        let original = self
            .storage
            .download(&object_key(MAP_CONTENTS_PREFIX, &cover.filename))
            .await?;

        let (data, format) = tokio::task::spawn_blocking(move || center_square_crop(&original))
            .await
            .map_err(|e| AppError::Internal(format!("Image crop task failed: {}", e)))??;

        let filename = stored_filename("map-ar", extension_for(format));
        let mimetype = content_type_for(&filename);
        let size = data.len() as i64;

        self.storage
            .upload(&object_key(MAP_CONTENTS_PREFIX, &filename), data, mimetype)
            .await?;

        let file = self
            .insert_file(cover.user_id, &cover.original_name, &filename, size, mimetype)
            .await?;

        debug!("AR cover {} derived from {}", file.filename, cover.filename);
        Ok(file)
    }

    async fn insert_file(
        &self,
        user_id: Uuid,
        original_name: &str,
        filename: &str,
        size: i64,
        mimetype: &str,
    ) -> Result<File> {
        sqlx::query_as::<_, File>(
            r#"
            INSERT INTO files (user_id, kind, original_name, filename, size, mimetype)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(FileKind::ImageMap)
        .bind(original_name)
        .bind(filename)
        .bind(size)
        .bind(mimetype)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save file metadata: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Fetch a stored media object for the public media routes
    pub async fn read_media(&self, prefix: &str, filename: &str) -> Result<(Vec<u8>, &'static str)> {
        if !is_safe_filename(filename) {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        let data = self.storage.download(&object_key(prefix, filename)).await?;
        Ok((data, content_type_for(filename)))
    }

    /// Run [`cleanup_unused`] in the background for each user
    pub fn spawn_cleanup(&self, user_ids: impl IntoIterator<Item = Uuid>) {
        let user_ids: HashSet<Uuid> = user_ids.into_iter().collect();

        for user_id in user_ids {
            let pool = self.pool.clone();
            let storage = Arc::clone(&self.storage);

            tokio::spawn(async move {
                if let Err(e) = cleanup_unused(&pool, storage.as_ref(), Some(user_id)).await {
                    warn!("Unused file cleanup failed for user {}: {}", user_id, e);
                }
            });
        }
    }

    /// Delete objects whose rows are already gone. Failures are only logged.
    pub fn spawn_delete_objects(&self, keys: Vec<String>) {
        if keys.is_empty() {
            return;
        }

        let storage = Arc::clone(&self.storage);
        tokio::spawn(async move {
            for key in keys {
                if let Err(e) = storage.delete(&key).await {
                    warn!("Failed to delete object '{}': {}", key, e);
                }
            }
        });
    }
}

/// Flag files as attached to a place or review.
///
/// Only unused files and files in `held` (already attached to the same place
/// or review) can be claimed. Fails when any id is gone or taken, so a
/// concurrent cleanup or a second holder cannot share an image.
pub async fn mark_used(
    conn: &mut PgConnection,
    ids: &[Uuid],
    held: &[Uuid],
    kind: FileKind,
) -> Result<()> {
    let unique: HashSet<Uuid> = ids.iter().copied().collect();
    if unique.is_empty() {
        return Ok(());
    }
    let unique: Vec<Uuid> = unique.into_iter().collect();

    let result = sqlx::query(
        r#"
        UPDATE files SET used = TRUE, kind = $2, updated_at = NOW()
        WHERE id = ANY($1) AND (used = FALSE OR id = ANY($3))
        "#,
    )
    .bind(&unique)
    .bind(kind)
    .bind(held)
    .execute(conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to mark files used: {:?}", e);
        AppError::Database(e)
    })?;

    if result.rows_affected() != unique.len() as u64 {
        return Err(AppError::BadRequest(
            "Some images are no longer available, please upload them again".to_string(),
        ));
    }

    Ok(())
}

/// Release files so the next cleanup removes them
pub async fn mark_unused(conn: &mut PgConnection, ids: &[Uuid]) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }

    sqlx::query("UPDATE files SET used = FALSE, updated_at = NOW() WHERE id = ANY($1)")
        .bind(ids)
        .execute(conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark files unused: {:?}", e);
            AppError::Database(e)
        })?;

    Ok(())
}

/// Remove unused files (optionally for one user) older than the grace period.
///
/// Rows go first so a concurrent [`mark_used`] fails instead of claiming a file
/// whose object is being deleted. Object deletion is best effort.
async fn cleanup_unused(
    pool: &PgPool,
    storage: &dyn ObjectStorage,
    user_id: Option<Uuid>,
) -> Result<usize> {
    let removed = sqlx::query_as::<_, File>(
        r#"
        DELETE FROM files
        WHERE used = FALSE
          AND created_at < NOW() - make_interval(mins => $1)
          AND ($2::uuid IS NULL OR user_id = $2)
        RETURNING *
        "#,
    )
    .bind(UNUSED_FILE_GRACE_MINUTES)
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to delete unused files: {:?}", e);
        AppError::Database(e)
    })?;

    for file in &removed {
        if let Err(e) = storage
            .delete(&object_key(MAP_CONTENTS_PREFIX, &file.filename))
            .await
        {
            warn!("Failed to delete object for file {}: {}", file.id, e);
        }
    }

    if !removed.is_empty() {
        info!("Cleaned up {} unused files", removed.len());
    }

    Ok(removed.len())
}

/// Storage names are flat; anything that could escape the prefix is refused
fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::MemoryStorage;
    use crate::shared::test_helpers::{lazy_pool, seed_file, seed_user, test_links};

    #[tokio::test]
    async fn test_read_media_serves_stored_object() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .upload("map-markers/map-marker-01.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        let service = FileService::new(lazy_pool(), storage, test_links());

        let (data, content_type) = service
            .read_media("map-markers", "map-marker-01.png")
            .await
            .unwrap();
        assert_eq!(data, vec![1, 2, 3]);
        assert_eq!(content_type, "image/png");

        assert!(matches!(
            service.read_media("map-markers", "missing.png").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.read_media("map-markers", "../avatars/x.png").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_is_safe_filename() {
        assert!(is_safe_filename("map-content-1-2.png"));
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename("../secret"));
        assert!(!is_safe_filename("avatars/x.png"));
        assert!(!is_safe_filename("a\\b.png"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_find_user_files_skips_taken_files(pool: PgPool) {
        let user_id = seed_user(&pool).await;
        let stranger_id = seed_user(&pool).await;
        let taken = seed_file(&pool, user_id, true).await;
        let free = seed_file(&pool, user_id, false).await;
        let foreign = seed_file(&pool, stranger_id, false).await;
        let service = FileService::new(pool.clone(), Arc::new(MemoryStorage::new()), test_links());

        let ids = [taken, free, foreign];
        let found: Vec<Uuid> = service
            .find_user_files(user_id, &ids, &[])
            .await
            .unwrap()
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(found, vec![free]);

        let found = service.find_user_files(user_id, &ids, &[taken]).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_mark_used_refuses_file_held_elsewhere(pool: PgPool) {
        let user_id = seed_user(&pool).await;
        let taken = seed_file(&pool, user_id, true).await;
        let free = seed_file(&pool, user_id, false).await;
        let mut tx = pool.begin().await.unwrap();
        assert!(matches!(
            mark_used(&mut *tx, &[taken, free], &[], FileKind::ImageReview).await,
            Err(AppError::BadRequest(_))
        ));
        tx.rollback().await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        mark_used(&mut *conn, &[taken, free], &[taken], FileKind::ImageReview)
            .await
            .unwrap();
        let kinds: Vec<FileKind> =
            sqlx::query_scalar("SELECT kind FROM files WHERE id = ANY($1) AND used")
                .bind(vec![taken, free])
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(kinds, vec![FileKind::ImageReview; 2]);
    }
}
