use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Ownership and image columns of a review, enough to authorise and release
/// its files
#[derive(Debug, Clone, FromRow)]
pub struct PlaceReview {
    pub id: Uuid,
    pub user_id: Uuid,
    pub place_id: Uuid,
    pub image_ids: Vec<Uuid>,
}

pub const PLACE_REVIEW_COLUMNS: &str = "id, user_id, place_id, image_ids";

/// Review joined with its author
pub const REVIEW_SELECT: &str = r#"
    SELECT r.id, r.user_id, r.place_id, r.rating, r.content, r.image_ids,
           r.created_at, r.updated_at,
           u.name AS author_name, u.avatar AS author_avatar
    FROM place_reviews r
    JOIN users u ON u.id = r.user_id
"#;

#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub place_id: Uuid,
    pub rating: i32,
    pub content: String,
    pub image_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_name: String,
    pub author_avatar: Option<String>,
}
