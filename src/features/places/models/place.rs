use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::places::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "place_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum PlaceStatus {
    Draft,
    Published,
}

impl fmt::Display for PlaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceStatus::Draft => write!(f, "DRAFT"),
            PlaceStatus::Published => write!(f, "PUBLISHED"),
        }
    }
}

/// One day of the weekly schedule. `day_index` 0 is Sunday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OpeningHoursDay {
    #[serde(default)]
    pub day_index: i32,
    #[serde(default)]
    pub closed: bool,
    /// Open around the clock
    #[serde(default)]
    pub full_opening_hours: bool,
    /// "HH:MM"
    #[serde(default)]
    pub opening_hours: String,
    /// "HH:MM"
    #[serde(default)]
    pub closing_hours: String,
}

/// Database model for places
#[derive(Debug, Clone, FromRow)]
pub struct Place {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: PlaceStatus,
    pub name: String,
    pub description: String,
    pub category_id: Uuid,
    pub map_image_ids: Vec<Uuid>,
    pub map_image_cover_id: Option<Uuid>,
    pub map_ar_image_cover_id: Option<Uuid>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub opening_hours: Json<Vec<OpeningHoursDay>>,
    pub website: Option<String>,
    pub phone: String,
    pub price: Decimal,
    pub rating: f64,
    pub views: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub saved: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Place {
    /// Stored positions are range-checked by the table constraints
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Every file the place holds on to, AR cover included
    pub fn file_ids(&self) -> Vec<Uuid> {
        let mut ids = self.map_image_ids.clone();
        ids.extend(self.map_image_cover_id);
        ids.extend(self.map_ar_image_cover_id);
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Columns shared by every place listing: the place summary, its category
/// and the cover images
pub const PLACE_CARD_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.status, p.name, p.description, p.address,
           p.latitude, p.longitude, p.price, p.rating,
           p.views, p.likes, p.dislikes, p.saved,
           p.category_id, c.name AS category_name, c.map_marker AS category_map_marker,
           cf.id AS cover_id, cf.filename AS cover_filename,
           af.id AS ar_cover_id, af.filename AS ar_cover_filename,
           p.created_at, p.updated_at
    FROM places p
    JOIN place_categories c ON c.id = p.category_id
    LEFT JOIN files cf ON cf.id = p.map_image_cover_id
    LEFT JOIN files af ON af.id = p.map_ar_image_cover_id
"#;

#[derive(Debug, Clone, FromRow)]
pub struct PlaceCardRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: PlaceStatus,
    pub name: String,
    pub description: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price: Decimal,
    pub rating: f64,
    pub views: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub saved: i64,
    pub category_id: Uuid,
    pub category_name: String,
    pub category_map_marker: String,
    pub cover_id: Option<Uuid>,
    pub cover_filename: Option<String>,
    pub ar_cover_id: Option<Uuid>,
    pub ar_cover_filename: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlaceCardRow {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_hours_defaults() {
        let day: OpeningHoursDay = serde_json::from_value(serde_json::json!({
            "closed": true
        }))
        .unwrap();
        assert!(day.closed);
        assert_eq!(day.day_index, 0);
        assert!(day.opening_hours.is_empty());
    }
}
