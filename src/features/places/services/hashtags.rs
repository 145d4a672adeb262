use std::collections::HashSet;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::shared::validation::HASHTAG_DISALLOWED_CHARS;

/// Canonical hashtag names, first occurrence order kept
pub fn normalize(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();

    raw.iter()
        .map(|tag| {
            let lowered = tag.trim().to_lowercase();
            HASHTAG_DISALLOWED_CHARS
                .replace_all(&lowered, "_")
                .into_owned()
        })
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Replace the hashtags attached to a place
pub async fn replace_place_hashtags(
    conn: &mut PgConnection,
    place_id: Uuid,
    names: &[String],
) -> Result<()> {
    sqlx::query("DELETE FROM place_hashtags WHERE place_id = $1")
        .bind(place_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to clear place hashtags: {:?}", e);
            AppError::Database(e)
        })?;

    if names.is_empty() {
        return Ok(());
    }

    // Upsert so concurrent submissions with a new tag share one row
    let ids: Vec<Uuid> = sqlx::query_scalar(
        r#"
        INSERT INTO hashtags (name)
        SELECT UNNEST($1::varchar[])
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(names)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert hashtags: {:?}", e);
        AppError::Database(e)
    })?;

    sqlx::query(
        r#"
        INSERT INTO place_hashtags (place_id, hashtag_id)
        SELECT $1, UNNEST($2::uuid[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(place_id)
    .bind(&ids)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to link place hashtags: {:?}", e);
        AppError::Database(e)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_rewrites_disallowed_chars() {
        assert_eq!(
            normalize(&tags(&["  Pantai Indah ", "sunset-view", "Kopi#1"])),
            vec!["pantai_indah", "sunset_view", "kopi_1"]
        );
    }

    #[test]
    fn test_normalize_skips_empty_and_duplicates() {
        assert_eq!(
            normalize(&tags(&["", "   ", "Bali", "bali", "BALI "])),
            vec!["bali"]
        );
    }

    #[test]
    fn test_normalize_keeps_allowed_chars() {
        assert_eq!(normalize(&tags(&["snake_case_99"])), vec!["snake_case_99"]);
    }
}
