use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for place categories
#[derive(Debug, Clone, FromRow)]
pub struct PlaceCategory {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Storage name of the PNG marker under `map-markers/`
    pub map_marker: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
