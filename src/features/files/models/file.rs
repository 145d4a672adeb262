use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// What an uploaded image ended up attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "file_kind", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileKind {
    ImageMap,
    ImageReview,
}

/// Database model for uploaded images
#[derive(Debug, Clone, FromRow)]
pub struct File {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: FileKind,
    pub original_name: String,
    /// Storage name under the `map-contents/` prefix
    pub filename: String,
    pub size: i64,
    pub mimetype: String,
    /// Referenced by a place or review; unused files are swept by cleanup
    pub used: bool,
    pub created_at: DateTime<Utc>,
}
